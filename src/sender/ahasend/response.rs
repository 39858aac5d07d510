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

//! AhaSend response module.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    data: Vec<AcceptedMessage>,
}

#[derive(Debug, Deserialize)]
struct AcceptedMessage {
    #[serde(default)]
    id: Option<String>,
}

/// Extracts the message ids of a successful response body, one per
/// accepted recipient. Returns [`None`] when the body does not have
/// the expected shape.
pub fn parse_message_ids(body: &str) -> Option<Vec<String>> {
    let res: MessagesResponse = serde_json::from_str(body).ok()?;
    Some(
        res.data
            .into_iter()
            .filter_map(|msg| msg.id)
            .filter(|id| !id.is_empty())
            .collect(),
    )
}
