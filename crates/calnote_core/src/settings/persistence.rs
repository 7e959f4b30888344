//! Durable storage contract for the raw settings blob.

use crate::db::DbError;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};

/// Failure while loading or saving the settings blob.
#[derive(Debug)]
pub enum PersistenceError {
    Db(DbError),
    Encode(serde_json::Error),
    Backend(String),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "settings blob encoding failed: {err}"),
            Self::Backend(message) => write!(f, "settings storage failed: {message}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Backend(_) => None,
        }
    }
}

impl From<DbError> for PersistenceError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Key-value blob load/save primitive.
#[allow(async_fn_in_trait)]
pub trait SettingsPersistence {
    /// Returns the stored blob, or `None` when nothing was saved yet.
    async fn load(&self) -> Result<Option<Value>, PersistenceError>;
    async fn save(&self, blob: &Value) -> Result<(), PersistenceError>;
}

/// Process-local persistence, used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    blob: Mutex<Option<Value>>,
    saves: Mutex<usize>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: Value) -> Self {
        Self {
            blob: Mutex::new(Some(blob)),
            saves: Mutex::new(0),
        }
    }

    /// Last saved blob.
    pub fn stored(&self) -> Option<Value> {
        self.blob
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SettingsPersistence for MemoryPersistence {
    async fn load(&self) -> Result<Option<Value>, PersistenceError> {
        Ok(self.stored())
    }

    async fn save(&self, blob: &Value) -> Result<(), PersistenceError> {
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = Some(blob.clone());
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
