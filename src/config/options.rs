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

//! Options module.
//!
//! This module contains the persisted named configuration values of
//! the relay, stored in an SQLite `options` table, and the helpers
//! locating the database they live in.

use log::{debug, warn};
use rusqlite::{Connection, OptionalExtension};
use std::{
    env, fs, io,
    path::{Path, PathBuf},
    result,
};
use thiserror::Error;

use crate::{ReplyTo, SenderConfig};

pub const API_KEY: &str = "ahasend_api_key";
pub const ACCOUNT_ID: &str = "ahasend_account_id";
pub const FROM_EMAIL: &str = "ahasend_from_email";
pub const FROM_NAME: &str = "ahasend_from_name";
pub const REPLY_TO_EMAIL: &str = "ahasend_reply_to_email";
pub const REPLY_TO_NAME: &str = "ahasend_reply_to_name";
pub const REPLY_TO_FORCE: &str = "ahasend_reply_to_force";
pub const API_URL: &str = "ahasend_api_url";
pub const TIMEOUT: &str = "ahasend_timeout";

/// Every option owned by the relay, deleted on uninstall.
pub const ALL: [&str; 9] = [
    API_KEY,
    ACCOUNT_ID,
    FROM_EMAIL,
    FROM_NAME,
    REPLY_TO_EMAIL,
    REPLY_TO_NAME,
    REPLY_TO_FORCE,
    API_URL,
    TIMEOUT,
];

const DEFAULT_DB_DIR: &str = "ahasend";
const DEFAULT_DB_FILE: &str = "ahasend.sqlite";

const CREATE_OPTIONS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS options (
        name  TEXT NOT NULL PRIMARY KEY,
        value TEXT NOT NULL
    )
";

const SELECT_OPTION: &str = "
    SELECT value
    FROM options
    WHERE name = ?
";

const UPSERT_OPTION: &str = "
    INSERT OR REPLACE INTO options (name, value)
    VALUES (?, ?)
";

const DELETE_OPTION: &str = "
    DELETE FROM options
    WHERE name = ?
";

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("cannot expand database path {1}")]
    ExpandDatabasePathError(#[source] shellexpand::LookupError<env::VarError>, String),
    #[error("cannot find user data directory")]
    GetDataDirError,
    #[error("cannot create database directory {1}")]
    CreateDatabaseDirError(#[source] io::Error, PathBuf),
    #[error("cannot parse timeout option {0}")]
    ParseTimeoutError(String),

    #[error(transparent)]
    StoreError(#[from] rusqlite::Error),
}

pub type Result<T> = result::Result<T, OptionsError>;

/// Resolves the path of the SQLite database. A given path gets its
/// shell variables and `~` expanded, otherwise the database lives in
/// the user data directory, which is created when missing.
pub fn database_path(path: Option<&str>) -> Result<PathBuf> {
    match path.map(str::trim).filter(|path| !path.is_empty()) {
        Some(path) => shellexpand::full(path)
            .map(|path| PathBuf::from(path.to_string()))
            .map_err(|err| OptionsError::ExpandDatabasePathError(err, path.to_owned())),
        None => {
            let dir = dirs::data_dir()
                .ok_or(OptionsError::GetDataDirError)?
                .join(DEFAULT_DB_DIR);
            fs::create_dir_all(&dir)
                .map_err(|err| OptionsError::CreateDatabaseDirError(err, dir.clone()))?;
            Ok(dir.join(DEFAULT_DB_FILE))
        }
    }
}

/// Represents the persisted options store.
pub struct Options {
    conn: Connection,
}

impl Options {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("opening options store at {:?}", path.as_ref());
        Self::with_connection(Connection::open(path)?)
    }

    /// Opens the options store of the database resolved by
    /// [`database_path`].
    pub fn open_default(path: Option<&str>) -> Result<Self> {
        Self::open(database_path(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(CREATE_OPTIONS_TABLE, [])?;
        Ok(Self { conn })
    }

    pub fn get(&self, name: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(SELECT_OPTION, [name], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, name: &str, value: &str) -> Result<()> {
        self.conn.execute(UPSERT_OPTION, [name, value])?;
        Ok(())
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        self.conn.execute(DELETE_OPTION, [name])?;
        Ok(())
    }

    /// Deletes every option owned by the relay.
    pub fn delete_all(&self) -> Result<()> {
        for name in ALL {
            self.delete(name)?;
        }
        Ok(())
    }

    fn get_or_default(&self, name: &str) -> Result<String> {
        Ok(self.get(name)?.unwrap_or_default())
    }

    /// Loads the sender config from the stored options. Missing
    /// options are considered empty.
    pub fn load_sender_config(&self) -> Result<SenderConfig> {
        let reply_to_email = self.get_or_default(REPLY_TO_EMAIL)?;
        let reply_to_name = self.get_or_default(REPLY_TO_NAME)?;
        let reply_to = if reply_to_email.trim().is_empty() {
            None
        } else {
            Some(ReplyTo::new(reply_to_name, reply_to_email))
        };

        let timeout = match self.get(TIMEOUT)? {
            Some(timeout) if !timeout.trim().is_empty() => Some(
                timeout
                    .trim()
                    .parse()
                    .map_err(|_| OptionsError::ParseTimeoutError(timeout.to_owned()))?,
            ),
            _ => None,
        };

        Ok(SenderConfig {
            api_key: self.get_or_default(API_KEY)?,
            account_id: self.get_or_default(ACCOUNT_ID)?,
            from_name: self.get_or_default(FROM_NAME)?,
            from_email: self.get_or_default(FROM_EMAIL)?,
            reply_to,
            force_reply_to: parse_flag(&self.get_or_default(REPLY_TO_FORCE)?),
            api_url: self.get(API_URL)?.filter(|url| !url.trim().is_empty()),
            timeout,
        })
    }

    /// Saves the sender config, trimming surrounding whitespace from
    /// every text value.
    pub fn save_sender_config(&self, config: &SenderConfig) -> Result<()> {
        self.set(API_KEY, config.api_key.trim())?;
        self.set(ACCOUNT_ID, config.account_id.trim())?;
        self.set(FROM_NAME, config.from_name.trim())?;
        self.set(FROM_EMAIL, config.from_email.trim())?;

        match &config.reply_to {
            Some(reply_to) => {
                self.set(REPLY_TO_EMAIL, reply_to.email.trim())?;
                self.set(
                    REPLY_TO_NAME,
                    reply_to.name.as_deref().unwrap_or_default().trim(),
                )?;
            }
            None => {
                self.set(REPLY_TO_EMAIL, "")?;
                self.set(REPLY_TO_NAME, "")?;
            }
        }

        self.set(
            REPLY_TO_FORCE,
            if config.force_reply_to { "1" } else { "0" },
        )?;

        match config.api_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => self.set(API_URL, url)?,
            _ => self.delete(API_URL)?,
        }

        match config.timeout {
            Some(timeout) => self.set(TIMEOUT, &timeout.to_string())?,
            None => self.delete(TIMEOUT)?,
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "" | "0" | "false" | "no" | "off" => false,
        value => {
            warn!("invalid boolean option {:?}, considering it false", value);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use tempfile::tempdir;

    use crate::{ReplyTo, SenderConfig};

    use super::{database_path, Options, OptionsError, API_KEY, REPLY_TO_FORCE};

    #[test]
    fn database_path_expands_variables() {
        let dir = tempdir().unwrap();
        env::set_var("AHASEND_TEST_OPTIONS_DIR", dir.path());

        let path = database_path(Some(" $AHASEND_TEST_OPTIONS_DIR/relay.sqlite ")).unwrap();
        assert_eq!(dir.path().join("relay.sqlite"), path);

        let options = Options::open_default(Some("${AHASEND_TEST_OPTIONS_DIR}/relay.sqlite")).unwrap();
        options.set(API_KEY, "key").unwrap();
        drop(options);

        assert!(path.is_file());
        assert_eq!(
            Some("key".into()),
            Options::open(&path).unwrap().get(API_KEY).unwrap()
        );
    }

    #[test]
    fn database_path_undefined_variable() {
        assert!(matches!(
            database_path(Some("$AHASEND_TEST_UNDEFINED_VAR/relay.sqlite")),
            Err(OptionsError::ExpandDatabasePathError(_, path))
                if path == "$AHASEND_TEST_UNDEFINED_VAR/relay.sqlite"
        ));
    }

    #[test]
    fn get_set_delete() {
        let options = Options::open_in_memory().unwrap();
        assert_eq!(None, options.get(API_KEY).unwrap());

        options.set(API_KEY, "key-1").unwrap();
        options.set(API_KEY, "key-2").unwrap();
        assert_eq!(Some("key-2".into()), options.get(API_KEY).unwrap());

        options.delete(API_KEY).unwrap();
        assert_eq!(None, options.get(API_KEY).unwrap());
    }

    #[test]
    fn load_empty_sender_config() {
        let options = Options::open_in_memory().unwrap();
        assert_eq!(
            SenderConfig::default(),
            options.load_sender_config().unwrap()
        );
    }

    #[test]
    fn save_then_load_sender_config() {
        let options = Options::open_in_memory().unwrap();
        let config = SenderConfig {
            api_key: " key ".into(),
            account_id: "account".into(),
            from_name: "Site".into(),
            from_email: "site@localhost".into(),
            reply_to: Some(ReplyTo::new("Support", "support@localhost")),
            force_reply_to: true,
            api_url: None,
            timeout: Some(10),
        };
        options.save_sender_config(&config).unwrap();

        assert_eq!(
            SenderConfig {
                api_key: "key".into(),
                ..config
            },
            options.load_sender_config().unwrap()
        );
    }

    #[test]
    fn reply_to_without_email_is_ignored() {
        let options = Options::open_in_memory().unwrap();
        options.set(super::REPLY_TO_NAME, "Support").unwrap();
        assert_eq!(None, options.load_sender_config().unwrap().reply_to);
    }

    #[test]
    fn parse_force_flag() {
        let options = Options::open_in_memory().unwrap();

        options.set(REPLY_TO_FORCE, "1").unwrap();
        assert!(options.load_sender_config().unwrap().force_reply_to);

        options.set(REPLY_TO_FORCE, "").unwrap();
        assert!(!options.load_sender_config().unwrap().force_reply_to);

        options.set(REPLY_TO_FORCE, "maybe").unwrap();
        assert!(!options.load_sender_config().unwrap().force_reply_to);
    }

    #[test]
    fn delete_all() {
        let options = Options::open_in_memory().unwrap();
        options.set(API_KEY, "key").unwrap();
        options.set("unrelated", "value").unwrap();
        options.delete_all().unwrap();

        assert_eq!(None, options.get(API_KEY).unwrap());
        assert_eq!(Some("value".into()), options.get("unrelated").unwrap());
    }
}
