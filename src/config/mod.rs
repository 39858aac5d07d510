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

//! Config module.
//!
//! This module contains the sender configuration and the persisted
//! options it is loaded from.

pub mod sender_config;
pub use sender_config::{
    SenderConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, MAX_TIMEOUT_SECS,
};

pub mod options;
pub use options::{Options, OptionsError};
