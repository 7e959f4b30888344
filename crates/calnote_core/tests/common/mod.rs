#![allow(dead_code)]

use calnote_core::{
    ConfirmDialog, ConfirmPrompt, FileRef, Host, NoteDefaults, NoteIndex, Notifier, OpenMode,
    PaneManager, Period, PeriodicDefaults, PersistenceError, SettingsPersistence, Severity, Vault,
    VaultError, VaultResult,
};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;
use tokio::task::yield_now;

#[derive(Default)]
struct VaultState {
    folders: BTreeSet<String>,
    files: BTreeMap<String, String>,
    mutations: usize,
    fail_folders: bool,
    fail_files: bool,
    fail_reads: bool,
}

/// In-memory vault. Every async operation yields once before touching state
/// so concurrent callers interleave.
#[derive(Default)]
pub struct FakeVault {
    state: Mutex<VaultState>,
}

impl FakeVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_file(&self, path: &str, content: &str) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(path.to_string(), content.to_string());
    }

    pub fn seed_folder(&self, path: &str) {
        self.state
            .lock()
            .unwrap()
            .folders
            .insert(path.to_string());
    }

    pub fn fail_folders(&self) {
        self.state.lock().unwrap().fail_folders = true;
    }

    pub fn fail_files(&self) {
        self.state.lock().unwrap().fail_files = true;
    }

    pub fn fail_reads(&self) {
        self.state.lock().unwrap().fail_reads = true;
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.state.lock().unwrap().files.get(path).cloned()
    }

    pub fn file_count(&self) -> usize {
        self.state.lock().unwrap().files.len()
    }

    pub fn has_folder(&self, path: &str) -> bool {
        self.state.lock().unwrap().folders.contains(path)
    }

    /// Successful folder and file creations.
    pub fn mutations(&self) -> usize {
        self.state.lock().unwrap().mutations
    }
}

fn denied(path: &str) -> VaultError {
    VaultError::io(
        path,
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
    )
}

impl Vault for FakeVault {
    async fn create_folder(&self, path: &str) -> VaultResult<()> {
        yield_now().await;
        let mut state = self.state.lock().unwrap();
        if state.fail_folders {
            return Err(denied(path));
        }
        if !state.folders.insert(path.to_string()) {
            return Err(VaultError::AlreadyExists(path.to_string()));
        }
        state.mutations += 1;
        Ok(())
    }

    async fn create_file(&self, path: &str, content: &str) -> VaultResult<FileRef> {
        yield_now().await;
        let mut state = self.state.lock().unwrap();
        if state.fail_files {
            return Err(denied(path));
        }
        if state.files.contains_key(path) {
            return Err(VaultError::AlreadyExists(path.to_string()));
        }
        state.files.insert(path.to_string(), content.to_string());
        state.mutations += 1;
        Ok(FileRef::new(path))
    }

    async fn read_file(&self, path: &str) -> VaultResult<String> {
        yield_now().await;
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(denied(path));
        }
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| VaultError::NotFound(path.to_string()))
    }

    fn get_file_at(&self, path: &str) -> Option<FileRef> {
        self.state
            .lock()
            .unwrap()
            .files
            .contains_key(path)
            .then(|| FileRef::new(path))
    }
}

#[derive(Default)]
pub struct FakeIndex {
    notes: Mutex<HashMap<Period, FileRef>>,
    reindexed: Mutex<usize>,
}

impl FakeIndex {
    pub fn insert(&self, period: Period, file: FileRef) {
        self.notes.lock().unwrap().insert(period, file);
    }

    pub fn reindex_count(&self) -> usize {
        *self.reindexed.lock().unwrap()
    }
}

impl NoteIndex for FakeIndex {
    fn lookup(&self, period: &Period) -> Option<FileRef> {
        self.notes.lock().unwrap().get(period).cloned()
    }

    fn reindex(&self) {
        *self.reindexed.lock().unwrap() += 1;
    }
}

#[derive(Default)]
pub struct FakePanes {
    opened: Mutex<Vec<(FileRef, OpenMode)>>,
}

impl FakePanes {
    pub fn opened(&self) -> Vec<(FileRef, OpenMode)> {
        self.opened.lock().unwrap().clone()
    }
}

impl PaneManager for FakePanes {
    async fn open_file(&self, file: &FileRef, mode: OpenMode) {
        yield_now().await;
        self.opened.lock().unwrap().push((file.clone(), mode));
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(Severity, String)>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<(Severity, String)> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn report(&self, severity: Severity, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push((severity, message.to_string()));
    }
}

/// Dialog that answers every prompt with a fixed choice.
pub struct ScriptedDialog {
    accept: bool,
    prompts: Mutex<Vec<ConfirmPrompt>>,
}

impl ScriptedDialog {
    pub fn answering(accept: bool) -> Self {
        Self {
            accept,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<ConfirmPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

impl ConfirmDialog for ScriptedDialog {
    async fn ask(&self, prompt: &ConfirmPrompt) -> bool {
        self.prompts.lock().unwrap().push(prompt.clone());
        yield_now().await;
        self.accept
    }
}

pub struct FakeHost {
    pub vault: FakeVault,
    pub index: FakeIndex,
    pub panes: FakePanes,
    pub notifier: RecordingNotifier,
    pub dialog: ScriptedDialog,
    pub defaults: PeriodicDefaults,
    pub locale: String,
}

impl FakeHost {
    /// Host whose dialog accepts, with ISO weeks and no external defaults.
    pub fn new() -> Self {
        Self::with_dialog(ScriptedDialog::answering(true))
    }

    pub fn with_dialog(dialog: ScriptedDialog) -> Self {
        Self {
            vault: FakeVault::new(),
            index: FakeIndex::default(),
            panes: FakePanes::default(),
            notifier: RecordingNotifier::default(),
            dialog,
            defaults: PeriodicDefaults::default(),
            locale: "en-gb".to_string(),
        }
    }

    pub fn with_daily_defaults(mut self, defaults: NoteDefaults) -> Self {
        self.defaults.daily = defaults;
        self
    }
}

impl Host for FakeHost {
    type Vault = FakeVault;
    type Index = FakeIndex;
    type Panes = FakePanes;
    type Notifier = RecordingNotifier;
    type Dialog = ScriptedDialog;
    type Defaults = PeriodicDefaults;

    fn vault(&self) -> &FakeVault {
        &self.vault
    }

    fn index(&self) -> &FakeIndex {
        &self.index
    }

    fn panes(&self) -> &FakePanes {
        &self.panes
    }

    fn notifier(&self) -> &RecordingNotifier {
        &self.notifier
    }

    fn dialog(&self) -> &ScriptedDialog {
        &self.dialog
    }

    fn defaults(&self) -> &PeriodicDefaults {
        &self.defaults
    }

    fn system_locale(&self) -> String {
        self.locale.clone()
    }
}

/// Persistence that yields on every call and can be told to fail.
pub struct FlakyPersistence {
    pub fail_load: bool,
    pub fail_save: bool,
    saved: Mutex<Vec<Value>>,
}

impl FlakyPersistence {
    pub fn healthy() -> Self {
        Self {
            fail_load: false,
            fail_save: false,
            saved: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_saves() -> Self {
        Self {
            fail_load: false,
            fail_save: true,
            saved: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_loads() -> Self {
        Self {
            fail_load: true,
            fail_save: false,
            saved: Mutex::new(Vec::new()),
        }
    }

    pub fn saved(&self) -> Vec<Value> {
        self.saved.lock().unwrap().clone()
    }
}

impl SettingsPersistence for FlakyPersistence {
    async fn load(&self) -> Result<Option<Value>, PersistenceError> {
        yield_now().await;
        if self.fail_load {
            return Err(PersistenceError::Backend("disk unavailable".to_string()));
        }
        Ok(None)
    }

    async fn save(&self, blob: &Value) -> Result<(), PersistenceError> {
        yield_now().await;
        if self.fail_save {
            return Err(PersistenceError::Backend("disk full".to_string()));
        }
        self.saved.lock().unwrap().push(blob.clone());
        Ok(())
    }
}
