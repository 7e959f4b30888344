//! Idempotent target-folder creation.

use crate::host::{Vault, VaultResult};
use log::debug;

/// Ensures note folders exist before files are created in them.
pub struct FolderProvisioner<'a, V: Vault> {
    vault: &'a V,
}

impl<'a, V: Vault> FolderProvisioner<'a, V> {
    pub fn new(vault: &'a V) -> Self {
        Self { vault }
    }

    /// Creates `path` unless it is empty or already present.
    ///
    /// # Errors
    /// - Any vault failure other than `AlreadyExists`, unchanged.
    pub async fn ensure(&self, path: &str) -> VaultResult<()> {
        let folder = normalize_folder(path);
        if folder.is_empty() {
            return Ok(());
        }

        match self.vault.create_folder(folder).await {
            Ok(()) => {
                debug!("event=folder_ensure module=provisioner status=ok created=true path={folder}");
                Ok(())
            }
            Err(err) if err.is_already_exists() => {
                debug!("event=folder_ensure module=provisioner status=ok created=false path={folder}");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

/// Trims whitespace and trailing `/` from a configured folder.
pub fn normalize_folder(path: &str) -> &str {
    path.trim().trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::normalize_folder;

    #[test]
    fn normalize_folder_strips_trailing_slashes() {
        assert_eq!(normalize_folder("journal/weekly/"), "journal/weekly");
        assert_eq!(normalize_folder("  "), "");
        assert_eq!(normalize_folder("/"), "");
    }
}
