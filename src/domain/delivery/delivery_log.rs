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

//! Delivery log module.
//!
//! This module contains the SQLite store of the delivery log: one
//! row is appended per send attempt, rows are listed for display and
//! deleted only once older than the retention period.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use log::{debug, info, warn};
use rusqlite::{params, Connection};
use std::{path::Path, result};
use thiserror::Error;

use crate::{options, DeliveryLogEntry, DeliveryStatus, OptionsError};

/// Represents how long entries are kept, in days.
pub const RETENTION_DAYS: i64 = 30;

/// Times are stored in UTC with a fixed microsecond fraction, so that
/// comparing them as text compares them as times.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Also reads times stored without fraction.
const TIME_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const CREATE_LOG_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS ahasend_email_log (
        id         INTEGER  NOT NULL PRIMARY KEY AUTOINCREMENT,
        time       DATETIME NOT NULL,
        recipient  TEXT     NOT NULL,
        subject    TEXT     NOT NULL,
        status     TEXT     NOT NULL,
        response   TEXT,
        message_id TEXT     NOT NULL DEFAULT ''
    )
";

const SELECT_LOG_COLUMNS: &str = "PRAGMA table_info(ahasend_email_log)";

const ADD_MESSAGE_ID_COLUMN: &str = "
    ALTER TABLE ahasend_email_log
    ADD COLUMN message_id TEXT NOT NULL DEFAULT ''
";

const DROP_LOG_TABLE: &str = "DROP TABLE IF EXISTS ahasend_email_log";

const INSERT_ENTRY: &str = "
    INSERT INTO ahasend_email_log (time, recipient, subject, status, response, message_id)
    VALUES (?, ?, ?, ?, ?, ?)
";

const DELETE_ENTRIES_BEFORE: &str = "
    DELETE FROM ahasend_email_log
    WHERE time < ?
";

const SELECT_ENTRIES: &str = "
    SELECT id, time, recipient, subject, status, response, message_id
    FROM ahasend_email_log
    ORDER BY time DESC, id DESC
";

#[derive(Debug, Error)]
pub enum DeliveryLogError {
    #[error("cannot resolve delivery log database path")]
    DatabasePathError(#[source] OptionsError),

    #[error(transparent)]
    StoreError(#[from] rusqlite::Error),
}

pub type Result<T> = result::Result<T, DeliveryLogError>;

/// Represents the delivery log store.
pub struct DeliveryLog {
    conn: Connection,
}

impl DeliveryLog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("opening delivery log at {:?}", path.as_ref());
        Self::with_connection(Connection::open(path)?)
    }

    /// Opens the delivery log of the database resolved by
    /// [`options::database_path`], shared with the options store.
    pub fn open_default(path: Option<&str>) -> Result<Self> {
        let path = options::database_path(path).map_err(DeliveryLogError::DatabasePathError)?;
        Self::open(path)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let log = Self { conn };
        log.create_table()?;
        Ok(log)
    }

    /// Creates the log table if missing. Tables created before the
    /// message id was recorded get the column added.
    pub fn create_table(&self) -> Result<()> {
        self.conn.execute(CREATE_LOG_TABLE, [])?;

        let columns = self
            .conn
            .prepare(SELECT_LOG_COLUMNS)?
            .query_map([], |row| row.get::<usize, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if !columns.iter().any(|column| column == "message_id") {
            info!("adding missing message_id column to the delivery log");
            self.conn.execute(ADD_MESSAGE_ID_COLUMN, [])?;
        }

        Ok(())
    }

    pub fn drop_table(&self) -> Result<()> {
        self.conn.execute(DROP_LOG_TABLE, [])?;
        Ok(())
    }

    /// Appends the entry and returns the identifier assigned to it.
    pub fn append(&self, entry: &DeliveryLogEntry) -> Result<i64> {
        self.conn.execute(
            INSERT_ENTRY,
            params![
                entry.time.format(TIME_FORMAT).to_string(),
                entry.recipient,
                entry.subject,
                entry.status.as_str(),
                entry.response,
                entry.message_id,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(
            "logged {} delivery to {} as entry {}",
            entry.status, entry.recipient, id
        );
        Ok(id)
    }

    /// Deletes the entries strictly older than `now - older_than` and
    /// returns how many were deleted.
    pub fn purge(&self, older_than: Duration) -> Result<usize> {
        self.purge_before(Utc::now() - older_than)
    }

    /// Deletes the entries strictly older than the cutoff and returns
    /// how many were deleted.
    pub fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let count = self.conn.execute(
            DELETE_ENTRIES_BEFORE,
            params![cutoff.format(TIME_FORMAT).to_string()],
        )?;
        info!("purged {} delivery log entries older than {}", count, cutoff);
        Ok(count)
    }

    /// Lists all the entries, most recent first.
    pub fn list(&self) -> Result<Vec<DeliveryLogEntry>> {
        let mut stmt = self.conn.prepare(SELECT_ENTRIES)?;
        let entries = stmt
            .query_map([], |row| {
                Ok(DeliveryLogEntry {
                    id: row.get(0)?,
                    time: {
                        let time: String = row.get(1)?;
                        match NaiveDateTime::parse_from_str(&time, TIME_PARSE_FORMAT) {
                            Ok(time) => Utc.from_utc_datetime(&time),
                            Err(err) => {
                                warn!("invalid log time {}, using unix epoch instead: {}", time, err);
                                DateTime::default()
                            }
                        }
                    },
                    recipient: row.get(2)?,
                    subject: row.get(3)?,
                    status: {
                        let status: String = row.get(4)?;
                        status.parse().unwrap_or_else(|status| {
                            warn!("invalid log status {}, considering it failed", status);
                            DeliveryStatus::Failed
                        })
                    },
                    response: row.get::<usize, Option<String>>(5)?.unwrap_or_default(),
                    message_id: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;

        Ok(entries)
    }
}
