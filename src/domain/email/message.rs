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

use serde::{Deserialize, Serialize};

/// Represents a mailbox of the AhaSend message. The name is always
/// serialized, even when empty.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct Address {
    pub name: String,
    pub email: String,
}

impl Address {
    pub fn new<N, E>(name: N, email: E) -> Self
    where
        N: ToString,
        E: ToString,
    {
        Self {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    pub fn new_nameless<E: ToString>(email: E) -> Self {
        Self::new("", email)
    }
}

/// Represents the reply-to mailbox. Unlike [`Address`], the name is
/// left out when there is none.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ReplyTo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
}

impl ReplyTo {
    /// Builds a reply-to mailbox from trimmed parts. An empty name
    /// means no name.
    pub fn new<N, E>(name: N, email: E) -> Self
    where
        N: AsRef<str>,
        E: AsRef<str>,
    {
        let name = name.as_ref().trim();
        Self {
            name: if name.is_empty() {
                None
            } else {
                Some(name.to_owned())
            },
            email: email.as_ref().trim().to_owned(),
        }
    }

    pub fn new_nameless<E: AsRef<str>>(email: E) -> Self {
        Self::new("", email)
    }
}

/// Represents the message payload of the AhaSend messages endpoint.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct ProviderMessage {
    pub from: Address,
    pub recipients: Vec<Address>,
    pub subject: String,
    pub text_content: String,
    pub html_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<ReplyTo>,
}

impl ProviderMessage {
    /// Joins the recipient emails with commas, the way they are
    /// recorded in the delivery log.
    pub fn joined_recipients(&self) -> String {
        self.recipients
            .iter()
            .map(|addr| addr.email.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Address, ProviderMessage, ReplyTo};

    #[test]
    fn serialize_without_reply_to() {
        let msg = ProviderMessage {
            from: Address::new("", ""),
            recipients: vec![Address::new_nameless("a@localhost")],
            subject: "subject".into(),
            text_content: "text".into(),
            html_content: "text".into(),
            reply_to: None,
        };

        assert_eq!(
            json!({
                "from": { "name": "", "email": "" },
                "recipients": [{ "name": "", "email": "a@localhost" }],
                "subject": "subject",
                "text_content": "text",
                "html_content": "text",
            }),
            serde_json::to_value(&msg).unwrap()
        );
    }

    #[test]
    fn serialize_nameless_reply_to() {
        let msg = ProviderMessage {
            reply_to: Some(ReplyTo::new_nameless("bob@x.com")),
            ..ProviderMessage::default()
        };

        assert_eq!(
            json!({ "email": "bob@x.com" }),
            serde_json::to_value(&msg).unwrap()["reply_to"]
        );
    }

    #[test]
    fn reply_to_parts_are_trimmed() {
        assert_eq!(
            ReplyTo {
                name: Some("Jane".into()),
                email: "jane@x.com".into(),
            },
            ReplyTo::new(" Jane ", " jane@x.com ")
        );
        assert_eq!(None, ReplyTo::new("   ", "jane@x.com").name);
    }
}
