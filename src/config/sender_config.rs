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

//! Sender config module.
//!
//! This module contains the representation of the AhaSend sender
//! configuration: credentials, sender identity and reply-to policy.

use serde::Deserialize;
use std::time::Duration;

use crate::ReplyTo;

pub const DEFAULT_API_URL: &str = "https://api.ahasend.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// Represents the AhaSend sender configuration.
///
/// It is read once (see [`crate::Options::load_sender_config`]) and
/// stays immutable for the duration of a send.
#[derive(Debug, Default, Clone, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// Represents the AhaSend API key, sent as a bearer token.
    pub api_key: String,
    /// Represents the AhaSend account identifier.
    pub account_id: String,
    /// Represents the display name of the sender.
    pub from_name: String,
    /// Represents the email address of the sender.
    pub from_email: String,
    /// Represents the default reply-to mailbox.
    pub reply_to: Option<ReplyTo>,
    /// Forces the default reply-to, ignoring any `Reply-To` header.
    pub force_reply_to: bool,
    /// Represents the API base URL.
    pub api_url: Option<String>,
    /// Represents the HTTP request timeout, in seconds.
    pub timeout: Option<u64>,
}

impl SenderConfig {
    /// Returns `true` when both the API key and the account id are
    /// set. Without them nothing can be relayed.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.account_id.trim().is_empty()
    }

    /// Gets the default reply-to. A reply-to without email counts as
    /// no reply-to.
    pub fn reply_to(&self) -> Option<&ReplyTo> {
        self.reply_to
            .as_ref()
            .filter(|reply_to| !reply_to.email.trim().is_empty())
    }

    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
    }

    /// Builds the messages endpoint of the configured account.
    pub fn messages_url(&self) -> String {
        format!(
            "{}/v2/accounts/{}/messages",
            self.api_url(),
            self.account_id.trim()
        )
    }

    /// Gets the request timeout. A missing or zero timeout falls back
    /// to the default one, and it never exceeds [`MAX_TIMEOUT_SECS`].
    pub fn timeout(&self) -> Duration {
        let secs = self
            .timeout
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .min(MAX_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }
}
