//! Terminal-backed panes, notices, confirmation, and the host bundle.

use crate::disk::{DiskVault, FolderNoteIndex};
use calnote_core::{
    ConfirmDialog, ConfirmPrompt, FileRef, Host, Notifier, OpenMode, PaneManager,
    PeriodicDefaults, Settings, Severity,
};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// "Opens" files by printing their absolute path.
pub struct StdoutPanes {
    root: PathBuf,
}

impl PaneManager for StdoutPanes {
    async fn open_file(&self, file: &FileRef, mode: OpenMode) {
        let target = self.root.join(file.path());
        if mode.new_split {
            println!("{} (split)", target.display());
        } else {
            println!("{}", target.display());
        }
    }
}

pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn report(&self, severity: Severity, message: &str) {
        let label = match severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        eprintln!("{label}: {message}");
    }
}

/// Asks on stdin; `assume_yes` accepts without asking.
pub struct TerminalDialog {
    assume_yes: bool,
}

impl ConfirmDialog for TerminalDialog {
    async fn ask(&self, prompt: &ConfirmPrompt) -> bool {
        if self.assume_yes {
            return true;
        }

        eprintln!("{}", prompt.title);
        eprint!("{} [{}/N] ", prompt.text, prompt.cta);
        let mut answer = String::new();
        let read = BufReader::new(tokio::io::stdin())
            .read_line(&mut answer)
            .await;
        let accepted = read.is_ok()
            && matches!(
                answer.trim().to_ascii_lowercase().as_str(),
                "y" | "yes" | "create"
            );
        info!(
            "event=confirm_prompt module=cli status=ok accepted={}",
            accepted
        );
        accepted
    }
}

pub struct DiskHost {
    vault: DiskVault,
    index: FolderNoteIndex,
    panes: StdoutPanes,
    notifier: StderrNotifier,
    dialog: TerminalDialog,
    defaults: PeriodicDefaults,
    locale: String,
}

impl DiskHost {
    pub fn new(
        root: PathBuf,
        settings: Arc<Settings>,
        defaults: PeriodicDefaults,
        assume_yes: bool,
    ) -> Self {
        let index = FolderNoteIndex::new(root.clone(), settings, defaults.clone());
        info!(
            "event=host_init module=cli status=ok root={} indexed={}",
            root.display(),
            index.file_count()
        );
        Self {
            vault: DiskVault::new(root.clone()),
            index,
            panes: StdoutPanes { root },
            notifier: StderrNotifier,
            dialog: TerminalDialog { assume_yes },
            defaults,
            locale: locale_from_env(),
        }
    }
}

impl Host for DiskHost {
    type Vault = DiskVault;
    type Index = FolderNoteIndex;
    type Panes = StdoutPanes;
    type Notifier = StderrNotifier;
    type Dialog = TerminalDialog;
    type Defaults = PeriodicDefaults;

    fn vault(&self) -> &DiskVault {
        &self.vault
    }

    fn index(&self) -> &FolderNoteIndex {
        &self.index
    }

    fn panes(&self) -> &StdoutPanes {
        &self.panes
    }

    fn notifier(&self) -> &StderrNotifier {
        &self.notifier
    }

    fn dialog(&self) -> &TerminalDialog {
        &self.dialog
    }

    fn defaults(&self) -> &PeriodicDefaults {
        &self.defaults
    }

    fn system_locale(&self) -> String {
        self.locale.clone()
    }
}

/// `LC_ALL` / `LANG` (`en_GB.UTF-8`) as a locale id (`en-gb`); `en` if unset.
fn locale_from_env() -> String {
    ["LC_ALL", "LC_TIME", "LANG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find_map(|value| normalize_posix_locale(&value))
        .unwrap_or_else(|| "en".to_string())
}

fn normalize_posix_locale(value: &str) -> Option<String> {
    let base = value.split(['.', '@']).next().unwrap_or_default().trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-").to_ascii_lowercase())
}
