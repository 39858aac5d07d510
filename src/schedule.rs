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

//! Schedule module.
//!
//! This module contains the recurring cleanup of the delivery log and
//! the lifecycle of the relay: activation schedules the cleanup,
//! deactivation clears it and uninstallation removes every trace of
//! the relay from the database.

use chrono::{DateTime, Duration, TimeZone, Utc};
use log::{debug, info};
use std::result;
use thiserror::Error;

use crate::{DeliveryLog, DeliveryLogError, Options, OptionsError, RETENTION_DAYS};

/// Represents the cleanup recurrence, in seconds (30 days).
pub const CLEANUP_INTERVAL_SECS: i64 = 2_592_000;

/// Represents the option holding the next cleanup run, as a unix
/// timestamp.
pub const NEXT_RUN_OPTION: &str = "ahasend_log_cleanup_next_run";

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("cannot parse next cleanup run {0}")]
    ParseNextRunError(String),

    #[error(transparent)]
    OptionsError(#[from] OptionsError),
    #[error(transparent)]
    DeliveryLogError(#[from] DeliveryLogError),
}

pub type Result<T> = result::Result<T, ScheduleError>;

pub struct CleanupSchedule<'a> {
    options: &'a Options,
    log: &'a DeliveryLog,
}

impl<'a> CleanupSchedule<'a> {
    pub fn new(options: &'a Options, log: &'a DeliveryLog) -> Self {
        Self { options, log }
    }

    /// Creates the log table and schedules a first cleanup right
    /// away, unless one is already scheduled.
    pub fn activate(&self, now: DateTime<Utc>) -> Result<()> {
        self.log.create_table()?;

        if self.next_run()?.is_none() {
            self.schedule(now)?;
        }

        Ok(())
    }

    pub fn deactivate(&self) -> Result<()> {
        debug!("clearing scheduled delivery log cleanup");
        self.options.delete(NEXT_RUN_OPTION)?;
        Ok(())
    }

    /// Drops the log table, deletes the options and clears the
    /// scheduled cleanup.
    pub fn uninstall(&self) -> Result<()> {
        info!("uninstalling ahasend relay");
        self.log.drop_table()?;
        self.options.delete_all()?;
        self.deactivate()
    }

    pub fn next_run(&self) -> Result<Option<DateTime<Utc>>> {
        let next_run = match self.options.get(NEXT_RUN_OPTION)? {
            Some(next_run) => next_run,
            None => return Ok(None),
        };

        let time = next_run
            .trim()
            .parse()
            .ok()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .ok_or_else(|| ScheduleError::ParseNextRunError(next_run.to_owned()))?;

        Ok(Some(time))
    }

    fn schedule(&self, time: DateTime<Utc>) -> Result<()> {
        debug!("scheduling delivery log cleanup at {}", time);
        self.options
            .set(NEXT_RUN_OPTION, &time.timestamp().to_string())?;
        Ok(())
    }

    /// Runs the cleanup when it is scheduled and due, then schedules
    /// the next one. Returns how many entries were purged, [`None`]
    /// when the cleanup did not run.
    pub fn run_pending(&self, now: DateTime<Utc>) -> Result<Option<usize>> {
        match self.next_run()? {
            Some(next_run) if next_run <= now => {
                let count = self
                    .log
                    .purge_before(now - Duration::days(RETENTION_DAYS))?;
                self.schedule(now + Duration::seconds(CLEANUP_INTERVAL_SECS))?;
                Ok(Some(count))
            }
            _ => Ok(None),
        }
    }
}
