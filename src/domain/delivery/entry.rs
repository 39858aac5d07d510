// ahasend-relay-lib, a Rust library relaying email through AhaSend.
// Copyright (C) 2024  the ahasend-relay-lib contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use chrono::{DateTime, Utc};
use std::{fmt, str::FromStr};

/// Represents the outcome of a send attempt, as recorded in the
/// delivery log.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DeliveryStatus {
    Success,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(status: &str) -> Result<Self, Self::Err> {
        match status.trim() {
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            status => Err(status.to_owned()),
        }
    }
}

/// Represents one record of the delivery log. Entries are appended
/// once and never updated.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeliveryLogEntry {
    /// Represents the identifier assigned by the store, [`None`]
    /// until the entry is appended.
    pub id: Option<i64>,
    pub time: DateTime<Utc>,
    /// Represents the recipient emails, joined with commas.
    pub recipient: String,
    pub subject: String,
    pub status: DeliveryStatus,
    /// Represents the raw response body, or the transport error
    /// message when no response was obtained.
    pub response: String,
    /// Represents the AhaSend message ids joined with commas, empty
    /// when unavailable.
    pub message_id: String,
}

impl DeliveryLogEntry {
    pub fn new<R, S>(recipient: R, subject: S, status: DeliveryStatus) -> Self
    where
        R: ToString,
        S: ToString,
    {
        Self {
            id: None,
            time: Utc::now(),
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            status,
            response: String::new(),
            message_id: String::new(),
        }
    }

    pub fn response<R: ToString>(mut self, response: R) -> Self {
        self.response = response.to_string();
        self
    }

    pub fn message_id<I: ToString>(mut self, message_id: I) -> Self {
        self.message_id = message_id.to_string();
        self
    }

    pub fn time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::DeliveryStatus;

    #[test]
    fn status() {
        assert_eq!("success", DeliveryStatus::Success.to_string());
        assert_eq!("failed", DeliveryStatus::Failed.to_string());
        assert_eq!(Ok(DeliveryStatus::Success), "success".parse());
        assert_eq!(Ok(DeliveryStatus::Failed), " failed".parse());
        assert_eq!(
            Err::<DeliveryStatus, _>("queued".to_owned()),
            "queued".parse()
        );
    }
}
