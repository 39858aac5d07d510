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

//! Interceptor module.
//!
//! This module contains the single entry point of the relay. A call
//! goes through `received -> mapped -> sent -> logged` and nothing
//! survives between calls.

use log::{debug, warn};

use crate::{mapper, AhaSend, DeliveryLog, OutgoingMailRequest, Sender, SenderConfig};

pub const TEST_EMAIL_SUBJECT: &str = "Test Email from Ahasend Plugin";
pub const TEST_EMAIL_BODY: &str = "This is a test email sent from the Ahasend Email Sender plugin.";

/// Represents what the host mail system should do after an
/// interception.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Interception {
    /// The relay attempted the send and logged it, whatever the
    /// provider answered. The host must not deliver the email.
    Handled,
    /// The relay is not configured. The host should deliver the email
    /// its default way.
    Deferred,
}

impl Interception {
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled)
    }
}

pub struct MailInterceptor<'a> {
    config: &'a SenderConfig,
    sender: Box<dyn Sender + 'a>,
    log: &'a DeliveryLog,
}

impl<'a> MailInterceptor<'a> {
    /// Builds an interceptor relaying through AhaSend.
    pub fn new(config: &'a SenderConfig, log: &'a DeliveryLog) -> Self {
        Self::with_sender(config, Box::new(AhaSend::new(config)), log)
    }

    pub fn with_sender(
        config: &'a SenderConfig,
        sender: Box<dyn Sender + 'a>,
        log: &'a DeliveryLog,
    ) -> Self {
        Self {
            config,
            sender,
            log,
        }
    }

    /// Intercepts an outgoing email.
    ///
    /// Without credentials the email is deferred untouched. Otherwise
    /// it is sent and exactly one delivery log entry is appended, and
    /// the email is considered handled even when the provider failed:
    /// failures only show up in the delivery log. Failing to write
    /// the log entry is logged and ignored.
    pub fn intercept(&mut self, req: &OutgoingMailRequest) -> Interception {
        if !self.config.has_credentials() {
            debug!("ahasend is not configured, deferring email");
            return Interception::Deferred;
        }

        let msg = mapper::build(req, self.config);
        let outcome = self.sender.send(&msg);

        let entry = match outcome.to_log_entry(&msg) {
            Some(entry) => entry,
            None => return Interception::Deferred,
        };

        if let Err(err) = self.log.append(&entry) {
            warn!(
                "cannot log {} delivery to {}: {}",
                entry.status, entry.recipient, err
            );
        }

        Interception::Handled
    }

    /// Sends the test email to the given address, through the same
    /// path as any other email.
    pub fn send_test_email(&mut self, to: &str) -> Interception {
        let req = OutgoingMailRequest::new(to.trim(), TEST_EMAIL_SUBJECT, TEST_EMAIL_BODY).headers(
            format!(
                "From: {} <{}>",
                self.config.from_name, self.config.from_email
            ),
        );
        self.intercept(&req)
    }
}
