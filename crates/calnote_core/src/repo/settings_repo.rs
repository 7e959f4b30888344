//! SQLite-backed settings blob storage.
//!
//! # Invariants
//! - One row per key in `plugin_data`; saves overwrite the previous value.
//! - Values are stored as JSON text and must decode on load.

use crate::db::{open_db, open_db_in_memory};
use crate::settings::persistence::{PersistenceError, SettingsPersistence};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Key the calendar settings blob is stored under.
pub const SETTINGS_KEY: &str = "calendar.settings";

/// Settings blob persisted in a `plugin_data` key-value table.
pub struct SqliteSettingsStore {
    conn: Mutex<Connection>,
    key: String,
}

impl SqliteSettingsStore {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self::with_key(conn, SETTINGS_KEY)
    }

    pub fn with_key(conn: Connection, key: impl Into<String>) -> Self {
        Self {
            conn: Mutex::new(conn),
            key: key.into(),
        }
    }

    /// Opens the database file at `path`, applying migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        Ok(Self::new(open_db_in_memory()?))
    }

    fn load_blob(&self) -> Result<Option<Value>, PersistenceError> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM plugin_data WHERE key = ?1;",
                [self.key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn save_blob(&self, blob: &Value) -> Result<(), PersistenceError> {
        let text = serde_json::to_string(blob)?;
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute(
            "INSERT INTO plugin_data (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.key.as_str(), text],
        )?;
        Ok(())
    }
}

impl SettingsPersistence for SqliteSettingsStore {
    async fn load(&self) -> Result<Option<Value>, PersistenceError> {
        self.load_blob()
    }

    async fn save(&self, blob: &Value) -> Result<(), PersistenceError> {
        self.save_blob(blob)
    }
}
