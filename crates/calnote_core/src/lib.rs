//! Core engine for calendar-driven periodic notes.
//! Resolves a clicked day or week to its note, creating it on demand.

pub mod db;
pub mod host;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod settings;
pub mod store;

pub use host::{
    ConfirmDialog, ConfirmPrompt, DefaultsProvider, Host, NoteDefaults, NoteIndex, Notifier,
    OpenMode, PaneManager, PeriodicDefaults, Severity, Vault, VaultError, VaultResult,
};
pub use logging::{default_log_level, init_logging, logging_status, LogInitError};
pub use model::note::{FileRef, NoteRecord};
pub use model::period::{Granularity, Period, PeriodError, WeekSpec};
pub use repo::settings_repo::SqliteSettingsStore;
pub use service::click_router::{CalendarClick, ClickOutcome, ClickRouter};
pub use service::note_materializer::{MaterializeError, MaterializeOutcome, NoteMaterializer};
pub use settings::persistence::{MemoryPersistence, PersistenceError, SettingsPersistence};
pub use settings::schema::{Settings, SettingsPatch};
pub use store::active_file::ActiveFileStore;
pub use store::config_store::{ConfigError, ConfigResult, ConfigStore};
pub use store::Subscription;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
