//! Host collaborator contracts.
//!
//! # Responsibility
//! - Describe the file system, note index, pane manager, notice channel and
//!   confirmation dialog the engine talks to.
//! - Bundle them behind one `Host` so services stay generic over a single
//!   parameter and tests can substitute fakes.
//!
//! # Invariants
//! - Futures returned by collaborators are polled on one thread; no `Send`
//!   bound is required.
//! - `Vault::create_folder` / `Vault::create_file` must report an existing
//!   target as `VaultError::AlreadyExists`, never as a generic I/O failure.

use crate::model::note::FileRef;
use crate::model::period::{Granularity, Period};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type VaultResult<T> = Result<T, VaultError>;

/// File-system primitive failure.
#[derive(Debug)]
pub enum VaultError {
    /// Target folder or file is already present.
    AlreadyExists(String),
    /// Target path does not exist.
    NotFound(String),
    /// Any other backend failure.
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl VaultError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

impl Display for VaultError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExists(path) => write!(f, "already exists: {path}"),
            Self::NotFound(path) => write!(f, "not found: {path}"),
            Self::Io { path, source } => write!(f, "{source} ({path})"),
        }
    }
}

impl Error for VaultError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Path-addressed file-system primitive.
#[allow(async_fn_in_trait)]
pub trait Vault {
    async fn create_folder(&self, path: &str) -> VaultResult<()>;
    async fn create_file(&self, path: &str, content: &str) -> VaultResult<FileRef>;
    async fn read_file(&self, path: &str) -> VaultResult<String>;
    fn get_file_at(&self, path: &str) -> Option<FileRef>;
}

/// Index mapping periods to existing notes.
pub trait NoteIndex {
    /// Looks `period` up in the current index snapshot.
    fn lookup(&self, period: &Period) -> Option<FileRef>;
    /// Rebuilds the snapshot from the current file tree.
    fn reindex(&self);
}

/// How a file should be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode {
    pub active: bool,
    pub new_split: bool,
}

impl OpenMode {
    pub fn active(new_split: bool) -> Self {
        Self {
            active: true,
            new_split,
        }
    }
}

/// Workspace pane manager.
#[allow(async_fn_in_trait)]
pub trait PaneManager {
    async fn open_file(&self, file: &FileRef, mode: OpenMode);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// User-visible transient notice channel.
pub trait Notifier {
    fn report(&self, severity: Severity, message: &str);
}

/// Content of a yes/no confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub text: String,
    pub cta: String,
}

/// Modal confirmation dialog. Resolves `true` only on explicit accept.
#[allow(async_fn_in_trait)]
pub trait ConfirmDialog {
    async fn ask(&self, prompt: &ConfirmPrompt) -> bool;
}

/// Naming parameters supplied by the periodic-notes configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDefaults {
    pub format: String,
    pub template: String,
    pub folder: String,
}

/// Source of externally configured periodic-note defaults.
pub trait DefaultsProvider {
    fn defaults(&self, granularity: Granularity) -> NoteDefaults;
}

/// Static defaults for both granularities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodicDefaults {
    pub daily: NoteDefaults,
    pub weekly: NoteDefaults,
}

impl DefaultsProvider for PeriodicDefaults {
    fn defaults(&self, granularity: Granularity) -> NoteDefaults {
        match granularity {
            Granularity::Day => self.daily.clone(),
            Granularity::Week => self.weekly.clone(),
        }
    }
}

/// Bundle of every collaborator the engine needs.
pub trait Host {
    type Vault: Vault;
    type Index: NoteIndex;
    type Panes: PaneManager;
    type Notifier: Notifier;
    type Dialog: ConfirmDialog;
    type Defaults: DefaultsProvider;

    fn vault(&self) -> &Self::Vault;
    fn index(&self) -> &Self::Index;
    fn panes(&self) -> &Self::Panes;
    fn notifier(&self) -> &Self::Notifier;
    fn dialog(&self) -> &Self::Dialog;
    fn defaults(&self) -> &Self::Defaults;

    /// Locale used when settings do not override it.
    fn system_locale(&self) -> String {
        "en".to_string()
    }
}
