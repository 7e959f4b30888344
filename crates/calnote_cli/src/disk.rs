//! Vault and note index over a plain directory tree.
//!
//! # Invariants
//! - Vault paths are `/`-separated and relative to the vault root.
//! - Existing targets map to `VaultError::AlreadyExists`.

use calnote_core::service::note_materializer::plan_note;
use calnote_core::{
    DefaultsProvider, FileRef, NoteIndex, Period, PeriodicDefaults, Settings, Vault, VaultError,
    VaultResult,
};
use log::{debug, warn};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Directory names skipped while indexing.
const IGNORED_DIRS: &[&str] = &[".calnote", ".git", ".obsidian", ".trash"];

pub struct DiskVault {
    root: PathBuf,
}

impl DiskVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a vault path under the root. `.` segments are dropped; `..` and
    /// prefix or root components are rejected.
    fn resolve(&self, path: &str) -> VaultResult<PathBuf> {
        let mut target = self.root.clone();
        for part in path.split(['/', '\\']) {
            match part {
                "" | "." => {}
                ".." => return Err(escapes_vault(path)),
                _ if Path::new(part)
                    .components()
                    .all(|component| matches!(component, Component::Normal(_))) =>
                {
                    target.push(part)
                }
                _ => return Err(escapes_vault(path)),
            }
        }
        Ok(target)
    }
}

fn escapes_vault(path: &str) -> VaultError {
    warn!(
        "event=vault_path module=cli status=error error_code=outside_vault path={}",
        path
    );
    VaultError::io(
        path,
        std::io::Error::new(ErrorKind::InvalidInput, "path escapes the vault root"),
    )
}

impl Vault for DiskVault {
    async fn create_folder(&self, path: &str) -> VaultResult<()> {
        let target = self.resolve(path)?;
        if tokio::fs::metadata(&target)
            .await
            .is_ok_and(|meta| meta.is_dir())
        {
            return Err(VaultError::AlreadyExists(path.to_string()));
        }
        tokio::fs::create_dir_all(&target)
            .await
            .map_err(|err| VaultError::io(path, err))
    }

    async fn create_file(&self, path: &str, content: &str) -> VaultResult<FileRef> {
        let target = self.resolve(path)?;
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
            .map_err(|err| match err.kind() {
                ErrorKind::AlreadyExists => VaultError::AlreadyExists(path.to_string()),
                _ => VaultError::io(path, err),
            })?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|err| VaultError::io(path, err))?;
        file.flush().await.map_err(|err| VaultError::io(path, err))?;
        Ok(FileRef::new(path))
    }

    async fn read_file(&self, path: &str) -> VaultResult<String> {
        tokio::fs::read_to_string(self.resolve(path)?)
            .await
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => VaultError::NotFound(path.to_string()),
                _ => VaultError::io(path, err),
            })
    }

    fn get_file_at(&self, path: &str) -> Option<FileRef> {
        self.resolve(path)
            .ok()?
            .is_file()
            .then(|| FileRef::new(path.trim_matches('/')))
    }
}

/// Snapshot of the markdown files in a vault, matched by planned note path.
pub struct FolderNoteIndex {
    root: PathBuf,
    settings: Arc<Settings>,
    defaults: PeriodicDefaults,
    files: RefCell<BTreeSet<String>>,
}

impl FolderNoteIndex {
    pub fn new(
        root: impl Into<PathBuf>,
        settings: Arc<Settings>,
        defaults: PeriodicDefaults,
    ) -> Self {
        let index = Self {
            root: root.into(),
            settings,
            defaults,
            files: RefCell::new(BTreeSet::new()),
        };
        index.reindex();
        index
    }

    pub fn file_count(&self) -> usize {
        self.files.borrow().len()
    }
}

impl NoteIndex for FolderNoteIndex {
    fn lookup(&self, period: &Period) -> Option<FileRef> {
        let defaults = self.defaults.defaults(period.granularity());
        let plan = plan_note(period, &self.settings, &defaults);
        self.files
            .borrow()
            .contains(&plan.path)
            .then(|| FileRef::new(plan.path))
    }

    fn reindex(&self) {
        let mut found = BTreeSet::new();
        scan_markdown(&self.root, "", &mut found);
        debug!(
            "event=index_rebuild module=cli status=ok files={}",
            found.len()
        );
        *self.files.borrow_mut() = found;
    }
}

fn scan_markdown(dir: &Path, prefix: &str, found: &mut BTreeSet<String>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(
                "event=index_scan module=cli status=skip path={} error={}",
                dir.display(),
                err
            );
            return;
        }
    };

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let relative = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };
        let Ok(kind) = entry.file_type() else {
            continue;
        };
        if kind.is_dir() {
            if !IGNORED_DIRS.contains(&name.as_str()) {
                scan_markdown(&entry.path(), &relative, found);
            }
        } else if kind.is_file() && name.ends_with(".md") {
            found.insert(relative);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DiskVault, FolderNoteIndex};
    use calnote_core::{NoteIndex, Period, PeriodicDefaults, Settings, Vault, WeekSpec};
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn march_15() -> Period {
        Period::day(
            NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date"),
            WeekSpec::ISO,
        )
    }

    #[tokio::test]
    async fn create_file_reports_existing_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        let vault = DiskVault::new(dir.path());

        vault.create_folder("daily").await.expect("create folder");
        assert!(vault
            .create_folder("daily")
            .await
            .expect_err("second create")
            .is_already_exists());

        let file = vault
            .create_file("daily/2024-03-15.md", "body")
            .await
            .expect("create file");
        assert_eq!(file.path(), "daily/2024-03-15.md");
        assert!(vault
            .create_file("daily/2024-03-15.md", "other")
            .await
            .expect_err("second create")
            .is_already_exists());
        assert_eq!(
            vault.read_file("daily/2024-03-15.md").await.expect("read"),
            "body"
        );
    }

    #[tokio::test]
    async fn paths_outside_the_vault_are_refused() {
        let dir = tempfile::tempdir().expect("tempdir");
        let vault_root = dir.path().join("vault");
        std::fs::create_dir_all(&vault_root).expect("mkdir");
        std::fs::write(dir.path().join("secret.md"), "outside").expect("write");
        let vault = DiskVault::new(&vault_root);

        assert!(vault.create_folder("../x").await.is_err());
        assert!(vault.create_folder("weekly/../../x").await.is_err());
        assert!(vault.create_file("../escaped.md", "body").await.is_err());
        assert!(vault.read_file("../secret.md").await.is_err());
        assert!(vault.get_file_at("../secret.md").is_none());
        assert!(!dir.path().join("x").exists());
        assert!(!dir.path().join("escaped.md").exists());

        vault.create_folder("./weekly/").await.expect("dot segment");
        assert!(vault_root.join("weekly").is_dir());
    }

    #[test]
    fn index_finds_planned_note_after_reindex() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join(".calnote")).expect("mkdir");
        std::fs::write(dir.path().join(".calnote/ignored.md"), "").expect("write");

        let index = FolderNoteIndex::new(
            dir.path(),
            Arc::new(Settings::default()),
            PeriodicDefaults::default(),
        );
        assert_eq!(index.file_count(), 0);
        assert!(index.lookup(&march_15()).is_none());

        std::fs::write(dir.path().join("2024-03-15.md"), "").expect("write");
        index.reindex();
        assert_eq!(
            index.lookup(&march_15()).map(|file| file.path().to_string()),
            Some("2024-03-15.md".to_string())
        );
    }
}
