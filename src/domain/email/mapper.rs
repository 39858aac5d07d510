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

//! Mapper module.
//!
//! This module maps a generic [`OutgoingMailRequest`] into the
//! [`ProviderMessage`] expected by AhaSend.

use log::debug;
use regex::Regex;
use std::sync::OnceLock;

use crate::{Address, Headers, OutgoingMailRequest, ProviderMessage, ReplyTo, SenderConfig};

const LINE_BREAK: &str = "<br>";

fn reply_to_header_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?i)^\s*reply-to\s*:\s*(\S.*)$").expect("reply-to header regex should be valid")
    })
}

fn mailbox_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^(.*)<([^<>]+)>$").expect("mailbox regex should be valid")
    })
}

/// Builds the AhaSend message of the given request.
pub fn build(req: &OutgoingMailRequest, config: &SenderConfig) -> ProviderMessage {
    let msg = ProviderMessage {
        from: Address::new(&config.from_name, &config.from_email),
        recipients: req.to.iter().map(Address::new_nameless).collect(),
        subject: req.subject.clone(),
        text_content: req.message.clone(),
        html_content: nl2br(&req.message),
        reply_to: resolve_reply_to(&req.headers, config),
    };

    debug!(
        "mapped message for {} recipient(s), reply-to: {:?}",
        msg.recipients.len(),
        msg.reply_to
    );

    msg
}

/// Resolves the reply-to of a message.
///
/// A forced config reply-to always wins and headers are not even
/// read. Otherwise the first `Reply-To` header wins over the config
/// reply-to, which is only used as a fallback.
pub fn resolve_reply_to(headers: &Headers, config: &SenderConfig) -> Option<ReplyTo> {
    if config.force_reply_to {
        return config.reply_to().cloned();
    }

    find_reply_to_header(headers).or_else(|| config.reply_to().cloned())
}

/// Finds the first `Reply-To` header line (key matched case
/// insensitively) and parses its value.
pub fn find_reply_to_header(headers: &Headers) -> Option<ReplyTo> {
    headers.lines().find_map(|line| {
        reply_to_header_regex()
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|value| parse_reply_to(value.as_str()))
    })
}

/// Parses a reply-to value, either `Display Name <email>` or a bare
/// email.
pub fn parse_reply_to(value: &str) -> ReplyTo {
    let value = value.trim();

    match mailbox_regex().captures(value) {
        Some(caps) => ReplyTo::new(&caps[1], &caps[2]),
        None => ReplyTo::new_nameless(value),
    }
}

/// Replaces every line ending of the text by a `<br>` tag. Nothing
/// else is escaped.
pub fn nl2br(text: &str) -> String {
    let mut html = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                chars.next_if_eq(&'\n');
                html.push_str(LINE_BREAK);
            }
            '\n' => html.push_str(LINE_BREAK),
            c => html.push(c),
        }
    }

    html
}
