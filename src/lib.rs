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

//! Rust library relaying outgoing email through the AhaSend API.
//!
//! The entry point is the [`MailInterceptor`]: it maps a generic
//! [`OutgoingMailRequest`] into a [`ProviderMessage`], sends it with
//! the [`AhaSend`] sender and records the outcome in the
//! [`DeliveryLog`].

pub mod config;
pub use config::*;

pub mod domain;
pub use domain::*;

pub mod sender;
pub use sender::*;

pub mod interceptor;
pub use interceptor::{Interception, MailInterceptor};

pub mod schedule;
pub use schedule::{CleanupSchedule, ScheduleError};
