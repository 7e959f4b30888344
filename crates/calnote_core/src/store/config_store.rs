//! Versioned, observable holder of the current settings.
//!
//! # Responsibility
//! - Serve lock-free snapshot reads of the authoritative `Settings`.
//! - Apply patches one at a time, notify listeners, then persist.
//!
//! # Invariants
//! - Patches are serialized FIFO; each patch function observes every patch
//!   accepted before it.
//! - A failed save never rolls back the in-memory value.
//! - `version` increases by one per published snapshot.

use crate::settings::persistence::{PersistenceError, SettingsPersistence};
use crate::settings::schema::{Settings, SettingsPatch};
use crate::store::listeners::ListenerSet;
use crate::store::Subscription;
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings store failure.
#[derive(Debug)]
pub enum ConfigError {
    /// Loading or saving the durable blob failed.
    Persist(PersistenceError),
    /// Settings could not be encoded into a blob.
    Encode(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persist(err) => write!(f, "settings persistence failed: {err}"),
            Self::Encode(err) => write!(f, "settings encoding failed: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persist(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<PersistenceError> for ConfigError {
    fn from(value: PersistenceError) -> Self {
        Self::Persist(value)
    }
}

#[derive(Clone)]
struct Snapshot {
    version: u64,
    settings: Arc<Settings>,
}

/// Process-wide settings holder, shared by handle.
pub struct ConfigStore<P> {
    current: RwLock<Snapshot>,
    listeners: ListenerSet<Settings>,
    patch_turn: Mutex<()>,
    persistence: P,
}

impl<P: SettingsPersistence> ConfigStore<P> {
    /// Creates a store holding hard-coded defaults at version 0.
    pub fn new(persistence: P) -> Self {
        Self {
            current: RwLock::new(Snapshot {
                version: 0,
                settings: Arc::new(Settings::default()),
            }),
            listeners: ListenerSet::new(),
            patch_turn: Mutex::new(()),
            persistence,
        }
    }

    /// Current settings snapshot.
    pub fn get(&self) -> Arc<Settings> {
        Arc::clone(&self.read_snapshot().settings)
    }

    pub fn version(&self) -> u64 {
        self.read_snapshot().version
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Registers `listener`, calling it once right away with the current value.
    pub fn subscribe(
        &self,
        listener: impl Fn(&Settings) + Send + Sync + 'static,
    ) -> Subscription {
        let listener = Arc::new(listener);
        listener(&self.get());
        self.listeners.add(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Merges the persisted blob over defaults and publishes the result.
    ///
    /// The merged value is written back so newly added keys reach storage.
    ///
    /// # Errors
    /// - `ConfigError::Persist` when loading fails; the store keeps its value.
    /// - `ConfigError::Persist` when the write-back fails; the hydrated value
    ///   stays published.
    pub async fn hydrate(&self) -> ConfigResult<Arc<Settings>> {
        let _turn = self.patch_turn.lock().await;

        let blob = self.persistence.load().await.inspect_err(|err| {
            error!(
                "event=settings_hydrate module=store status=error error_code=load_failed error={}",
                err
            );
        })?;
        let hydrated = self.publish(Settings::from_blob(blob.as_ref()));
        info!(
            "event=settings_hydrate module=store status=ok version={} persisted={}",
            self.version(),
            blob.is_some()
        );

        self.persist(&hydrated).await?;
        Ok(hydrated)
    }

    /// Applies a partial override computed from the current value.
    ///
    /// Listeners are notified before the save starts. Overlapping calls wait
    /// for their turn.
    ///
    /// # Errors
    /// - `ConfigError::Persist` / `ConfigError::Encode` when the save fails.
    ///   The merged value remains the current snapshot.
    pub async fn patch<F>(&self, change: F) -> ConfigResult<Arc<Settings>>
    where
        F: FnOnce(&Settings) -> SettingsPatch,
    {
        let _turn = self.patch_turn.lock().await;

        let current = self.get();
        let patch = change(&current);
        let merged = self.publish(current.merged(patch));
        debug!(
            "event=settings_patch module=store status=ok version={}",
            self.version()
        );

        self.persist(&merged).await?;
        Ok(merged)
    }

    /// Drops every listener. Used at shutdown.
    pub fn release(&self) {
        self.listeners.clear();
        debug!("event=settings_release module=store status=ok");
    }

    fn publish(&self, settings: Settings) -> Arc<Settings> {
        let settings = Arc::new(settings);
        {
            let mut current = self
                .current
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *current = Snapshot {
                version: current.version + 1,
                settings: Arc::clone(&settings),
            };
        }
        self.listeners.notify(&settings);
        settings
    }

    async fn persist(&self, settings: &Settings) -> ConfigResult<()> {
        let blob = settings.to_blob().map_err(ConfigError::Encode)?;
        self.persistence.save(&blob).await.map_err(|err| {
            error!(
                "event=settings_save module=store status=error error_code=save_failed error={}",
                err
            );
            ConfigError::Persist(err)
        })
    }

    fn read_snapshot(&self) -> Snapshot {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
