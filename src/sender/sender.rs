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

//! Sender module.
//!
//! This module contains the sender interface and the classification
//! of a send attempt.

use crate::{DeliveryLogEntry, DeliveryStatus, ProviderMessage};

/// Represents the outcome of a send attempt.
///
/// Provider-side failures are outcomes, not errors: they are recorded
/// in the delivery log and never reach the host mail system.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DeliveryOutcome {
    /// Credentials are missing: nothing was sent and the host should
    /// fall back to its default delivery.
    Declined,
    /// The provider accepted the message. The ids are empty when the
    /// response body could not be understood.
    Delivered {
        response: String,
        message_ids: Vec<String>,
    },
    /// The provider answered with a non-2xx status.
    Rejected { status: u16, response: String },
    /// No response could be obtained.
    TransportFailed(String),
}

impl DeliveryOutcome {
    /// Gets the status to record, [`None`] when nothing was attempted.
    pub fn status(&self) -> Option<DeliveryStatus> {
        match self {
            Self::Declined => None,
            Self::Delivered { .. } => Some(DeliveryStatus::Success),
            Self::Rejected { .. } | Self::TransportFailed(_) => Some(DeliveryStatus::Failed),
        }
    }

    /// Builds the delivery log entry of the attempt, [`None`] when
    /// nothing was attempted.
    pub fn to_log_entry(&self, msg: &ProviderMessage) -> Option<DeliveryLogEntry> {
        let recipient = msg.joined_recipients();

        let entry = match self {
            Self::Declined => return None,
            Self::Delivered {
                response,
                message_ids,
            } => DeliveryLogEntry::new(recipient, &msg.subject, DeliveryStatus::Success)
                .response(response)
                .message_id(message_ids.join(",")),
            Self::Rejected { response, .. } => {
                DeliveryLogEntry::new(recipient, &msg.subject, DeliveryStatus::Failed)
                    .response(response)
            }
            Self::TransportFailed(err) => {
                DeliveryLogEntry::new(recipient, &msg.subject, DeliveryStatus::Failed)
                    .response(err)
            }
        };

        Some(entry)
    }
}

pub trait Sender {
    /// Sends the message, making a single attempt.
    fn send(&mut self, msg: &ProviderMessage) -> DeliveryOutcome;
}
