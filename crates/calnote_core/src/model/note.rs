//! Resolved note references.

use crate::model::period::Period;
use std::fmt::{Display, Formatter};

/// Vault-relative path of a file known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileRef {
    path: String,
}

impl FileRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// File name without folder and without the final extension.
    pub fn basename(&self) -> &str {
        let name = self.name();
        match name.rfind('.') {
            Some(0) | None => name,
            Some(idx) => &name[..idx],
        }
    }

    /// File name including extension.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(self.path.as_str())
    }

    pub fn extension(&self) -> Option<&str> {
        let name = self.name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }
}

impl Display for FileRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

/// A file resolved for one period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    pub file: FileRef,
    pub period: Period,
}

/// Joins a folder and a file name with `/`, ignoring an empty folder.
pub fn join_vault_path(folder: &str, name: &str) -> String {
    let folder = folder.trim_end_matches('/');
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{folder}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::{join_vault_path, FileRef};

    #[test]
    fn file_ref_splits_name_parts() {
        let file = FileRef::new("journal/weekly/2024-W11.md");
        assert_eq!(file.name(), "2024-W11.md");
        assert_eq!(file.basename(), "2024-W11");
        assert_eq!(file.extension(), Some("md"));

        let dotfile = FileRef::new(".calnote");
        assert_eq!(dotfile.basename(), ".calnote");
        assert_eq!(dotfile.extension(), None);
    }

    #[test]
    fn join_vault_path_handles_root_and_trailing_slash() {
        assert_eq!(join_vault_path("", "a.md"), "a.md");
        assert_eq!(join_vault_path("notes/", "a.md"), "notes/a.md");
        assert_eq!(join_vault_path("notes", "a.md"), "notes/a.md");
    }
}
