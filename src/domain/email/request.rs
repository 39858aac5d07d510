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

//! Outgoing mail request module.
//!
//! This module contains the representation of a generic outgoing
//! email, as handed over by the host mail system.

/// Represents the recipients of a request: either a single address
/// or a list of addresses. No display name is available.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    /// Iterates over the recipient emails, preserving their order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let emails: &[String] = match self {
            Self::One(email) => std::slice::from_ref(email),
            Self::Many(emails) => emails,
        };
        emails.iter().map(String::as_str)
    }
}

impl Default for Recipients {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl From<&str> for Recipients {
    fn from(email: &str) -> Self {
        Self::One(email.to_owned())
    }
}

impl From<String> for Recipients {
    fn from(email: String) -> Self {
        Self::One(email)
    }
}

impl From<Vec<String>> for Recipients {
    fn from(emails: Vec<String>) -> Self {
        Self::Many(emails)
    }
}

impl From<Vec<&str>> for Recipients {
    fn from(emails: Vec<&str>) -> Self {
        Self::Many(emails.into_iter().map(ToOwned::to_owned).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Recipients {
    fn from(emails: [&str; N]) -> Self {
        Self::Many(emails.into_iter().map(ToOwned::to_owned).collect())
    }
}

/// Represents the raw header lines of a request (`Key: Value`).
///
/// Headers can be given as a newline-delimited block or as a list;
/// either way they end up as one entry per non-empty line.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Headers(Vec<String>);

impl Headers {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push_block(&mut self, block: &str) {
        self.0.extend(
            block
                .lines()
                .map(|line| line.trim_end_matches('\r'))
                .filter(|line| !line.trim().is_empty())
                .map(ToOwned::to_owned),
        )
    }
}

impl From<&str> for Headers {
    fn from(block: &str) -> Self {
        let mut headers = Self::default();
        headers.push_block(block);
        headers
    }
}

impl From<String> for Headers {
    fn from(block: String) -> Self {
        Self::from(block.as_str())
    }
}

impl<S: AsRef<str>> From<Vec<S>> for Headers {
    fn from(lines: Vec<S>) -> Self {
        let mut headers = Self::default();
        for line in lines {
            headers.push_block(line.as_ref());
        }
        headers
    }
}

/// Represents a generic outgoing mail request.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct OutgoingMailRequest {
    pub to: Recipients,
    pub subject: String,
    /// Represents the plain text body.
    pub message: String,
    pub headers: Headers,
}

impl OutgoingMailRequest {
    pub fn new<T, S, M>(to: T, subject: S, message: M) -> Self
    where
        T: Into<Recipients>,
        S: ToString,
        M: ToString,
    {
        Self {
            to: to.into(),
            subject: subject.to_string(),
            message: message.to_string(),
            headers: Headers::default(),
        }
    }

    pub fn headers<H: Into<Headers>>(mut self, headers: H) -> Self {
        self.headers = headers.into();
        self
    }
}
