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

//! AhaSend module.
//!
//! This module contains the representation of the AhaSend email
//! sender: it posts the message to the account messages endpoint and
//! classifies what came back.

use log::{debug, info, warn};
use reqwest::{
    blocking::{Client, Response},
    header::CONTENT_TYPE,
};
use std::{error, result};
use thiserror::Error;
use uuid::Uuid;

use crate::{DeliveryOutcome, ProviderMessage, Sender, SenderConfig};

use super::parse_message_ids;

pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

#[derive(Debug, Error)]
pub enum AhaSendError {
    #[error("cannot build http client")]
    BuildHttpClientError(#[source] reqwest::Error),
}

pub type Result<T> = result::Result<T, AhaSendError>;

pub struct AhaSend<'a> {
    config: &'a SenderConfig,
    client: Option<Client>,
}

impl<'a> AhaSend<'a> {
    pub fn new(config: &'a SenderConfig) -> Self {
        Self {
            config,
            client: None,
        }
    }

    fn client(&mut self) -> Result<&Client> {
        let client = match self.client.take() {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.config.timeout())
                .build()
                .map_err(AhaSendError::BuildHttpClientError)?,
        };

        Ok(self.client.insert(client))
    }
}

impl<'a> Sender for AhaSend<'a> {
    fn send(&mut self, msg: &ProviderMessage) -> DeliveryOutcome {
        if !self.config.has_credentials() {
            debug!("ahasend api key or account id missing, declining message");
            return DeliveryOutcome::Declined;
        }

        let url = self.config.messages_url();
        let api_key = self.config.api_key.trim().to_owned();
        let idempotency_key = Uuid::new_v4().to_string();

        let client = match self.client() {
            Ok(client) => client,
            Err(err) => {
                warn!("cannot send message to {}: {}", url, err);
                return DeliveryOutcome::TransportFailed(describe(&err));
            }
        };

        debug!(
            "sending message to {} ({} recipient(s), idempotency key {})",
            url,
            msg.recipients.len(),
            idempotency_key
        );

        let res = client
            .post(&url)
            .bearer_auth(api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(IDEMPOTENCY_KEY_HEADER, idempotency_key)
            .json(msg)
            .send();

        classify(res)
    }
}

/// Classifies the result of the HTTP request.
fn classify(res: reqwest::Result<Response>) -> DeliveryOutcome {
    let res = match res {
        Ok(res) => res,
        Err(err) => {
            warn!("cannot reach ahasend: {}", err);
            return DeliveryOutcome::TransportFailed(describe(&err));
        }
    };

    let status = res.status();
    let response = res.text().unwrap_or_else(|err| {
        warn!("cannot read ahasend response body: {}", err);
        String::new()
    });

    if status.is_success() {
        let message_ids = parse_message_ids(&response).unwrap_or_else(|| {
            warn!("cannot find message ids in ahasend response {:?}", response);
            Vec::new()
        });
        info!("ahasend accepted message (ids: {:?})", message_ids);
        DeliveryOutcome::Delivered {
            response,
            message_ids,
        }
    } else {
        warn!("ahasend rejected message with status {}", status);
        DeliveryOutcome::Rejected {
            status: status.as_u16(),
            response,
        }
    }
}

/// Describes the error together with its sources.
fn describe(err: &dyn error::Error) -> String {
    let mut desc = err.to_string();
    let mut source = err.source();

    while let Some(err) = source {
        let msg = err.to_string();
        if !desc.contains(&msg) {
            desc.push_str(": ");
            desc.push_str(&msg);
        }
        source = err.source();
    }

    desc
}

#[cfg(test)]
mod tests {
    use std::{error, fmt};

    use crate::{DeliveryOutcome, ProviderMessage, Sender, SenderConfig};

    use super::AhaSend;

    #[derive(Debug)]
    struct Outer(Inner);

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "error sending request")
        }
    }

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "connection refused")
        }
    }

    impl error::Error for Outer {
        fn source(&self) -> Option<&(dyn error::Error + 'static)> {
            Some(&self.0)
        }
    }

    impl error::Error for Inner {}

    #[test]
    fn describe_error_sources() {
        assert_eq!(
            "error sending request: connection refused",
            super::describe(&Outer(Inner))
        );
    }

    #[test]
    fn decline_without_credentials() {
        let config = SenderConfig {
            account_id: "account".into(),
            // never contacted
            api_url: Some("http://127.0.0.1:1".into()),
            ..SenderConfig::default()
        };

        assert_eq!(
            DeliveryOutcome::Declined,
            AhaSend::new(&config).send(&ProviderMessage::default())
        );
    }
}
