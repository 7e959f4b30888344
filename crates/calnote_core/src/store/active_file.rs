//! The file most recently opened through the calendar.

use crate::model::note::FileRef;
use crate::store::listeners::ListenerSet;
use crate::store::Subscription;
use std::sync::{Arc, PoisonError, RwLock};

/// Observable `Option<FileRef>` used to highlight the active note.
pub struct ActiveFileStore {
    current: RwLock<Option<FileRef>>,
    listeners: ListenerSet<Option<FileRef>>,
}

impl Default for ActiveFileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveFileStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            listeners: ListenerSet::new(),
        }
    }

    pub fn get(&self) -> Option<FileRef> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, file: FileRef) {
        self.replace(Some(file));
    }

    pub fn clear(&self) {
        self.replace(None);
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&Option<FileRef>) + Send + Sync + 'static,
    ) -> Subscription {
        let listener = Arc::new(listener);
        listener(&self.get());
        self.listeners.add(listener)
    }

    fn replace(&self, value: Option<FileRef>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = value.clone();
        self.listeners.notify(&value);
    }
}
