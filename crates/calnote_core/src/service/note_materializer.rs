//! Find-or-create orchestration for periodic notes.
//!
//! # Responsibility
//! - Decide between opening an existing note and creating a new one.
//! - Gate creation behind confirmation when configured.
//! - Provision the folder, render the template, create the file, reindex, open.
//!
//! # Invariants
//! - Declining confirmation performs zero vault mutations.
//! - A concurrent "already exists" on create resolves to the existing file and
//!   counts as success.
//! - Failures surface as exactly one notice and a `Failed` outcome; a folder
//!   created before the failure is left in place.
//! - At most one pane is opened per call.

use crate::host::{
    DefaultsProvider, Host, NoteDefaults, NoteIndex, Notifier, OpenMode, PaneManager, Severity,
    Vault, VaultError,
};
use crate::model::note::{join_vault_path, FileRef, NoteRecord};
use crate::model::period::{Granularity, Period};
use crate::service::folder_provisioner::{normalize_folder, FolderProvisioner};
use crate::service::interaction_gate::{creation_prompt, InteractionGate};
use crate::service::template_renderer::TemplateRenderer;
use crate::settings::schema::{Settings, DEFAULT_DAILY_FORMAT, DEFAULT_WEEK_FORMAT};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Creation failure reported to the user.
#[derive(Debug)]
pub enum MaterializeError {
    /// Target folder could not be provisioned.
    Folder { path: String, source: VaultError },
    /// Note file could not be created.
    Create { path: String, source: VaultError },
    /// The host reported the file as existing but could not resolve it.
    Unresolvable { path: String },
}

impl Display for MaterializeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Folder { path, source } => {
                write!(f, "could not create folder `{path}`: {source}")
            }
            Self::Create { path, source } => write!(f, "could not create `{path}`: {source}"),
            Self::Unresolvable { path } => {
                write!(f, "`{path}` already exists but could not be opened")
            }
        }
    }
}

impl Error for MaterializeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Folder { source, .. } | Self::Create { source, .. } => Some(source),
            Self::Unresolvable { .. } => None,
        }
    }
}

/// Result of one find-or-create call.
#[derive(Debug)]
pub enum MaterializeOutcome {
    /// An existing note was opened.
    Opened(NoteRecord),
    /// A note was created (or found created by a concurrent call) and opened.
    Created(NoteRecord),
    /// The user declined the confirmation dialog.
    Declined,
    /// Creation failed; a notice has been shown.
    Failed(MaterializeError),
}

impl MaterializeOutcome {
    pub fn record(&self) -> Option<&NoteRecord> {
        match self {
            Self::Opened(record) | Self::Created(record) => Some(record),
            Self::Declined | Self::Failed(_) => None,
        }
    }
}

/// Resolved name and location of a period's note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePlan {
    /// Formatted file name without extension.
    pub name: String,
    pub folder: String,
    pub template: String,
    /// Vault-relative path of the note file.
    pub path: String,
}

/// Computes the naming plan; settings win over external defaults for weeks.
pub fn plan_note(period: &Period, settings: &Settings, defaults: &NoteDefaults) -> NotePlan {
    let (format, template, folder) = match period.granularity() {
        Granularity::Day => (
            first_non_empty(&[&defaults.format], DEFAULT_DAILY_FORMAT),
            defaults.template.trim().to_string(),
            defaults.folder.clone(),
        ),
        Granularity::Week => (
            first_non_empty(
                &[&settings.weekly_note_format, &defaults.format],
                DEFAULT_WEEK_FORMAT,
            ),
            first_non_empty(&[&settings.weekly_note_template, &defaults.template], ""),
            first_non_empty(&[&settings.weekly_note_folder, &defaults.folder], ""),
        ),
    };

    let folder = normalize_folder(&folder).to_string();
    let name = period.format(&format);
    let path = join_vault_path(&folder, &format!("{name}.md"));
    NotePlan {
        name,
        folder,
        template,
        path,
    }
}

fn first_non_empty(candidates: &[&String], fallback: &str) -> String {
    candidates
        .iter()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Periodic-note materialization engine.
pub struct NoteMaterializer<'a, H: Host> {
    host: &'a H,
}

impl<'a, H: Host> NoteMaterializer<'a, H> {
    pub fn new(host: &'a H) -> Self {
        Self { host }
    }

    pub fn plan(&self, period: &Period, settings: &Settings) -> NotePlan {
        let defaults = self.host.defaults().defaults(period.granularity());
        plan_note(period, settings, &defaults)
    }

    /// Opens the note for `period`, creating it first when missing.
    ///
    /// `on_open` runs once with the opened note; it is dropped unused when
    /// the user declines or creation fails.
    pub async fn resolve_or_create<F>(
        &self,
        period: &Period,
        settings: &Settings,
        mode: OpenMode,
        on_open: F,
    ) -> MaterializeOutcome
    where
        F: FnOnce(&NoteRecord),
    {
        if let Some(file) = self.host.index().lookup(period) {
            let record = self.open(file, period, mode).await;
            on_open(&record);
            return MaterializeOutcome::Opened(record);
        }
        self.materialize(period, settings, mode, on_open).await
    }

    /// Creation path for a period the index does not know yet.
    pub async fn materialize<F>(
        &self,
        period: &Period,
        settings: &Settings,
        mode: OpenMode,
        on_open: F,
    ) -> MaterializeOutcome
    where
        F: FnOnce(&NoteRecord),
    {
        let plan = self.plan(period, settings);
        let prompt = creation_prompt(period.granularity().title(), &plan.name);
        let gate = InteractionGate::new(self.host.dialog());

        let created = gate
            .confirm_if(settings.should_confirm_before_create, &prompt, || {
                self.create_note(&plan, period)
            })
            .await;

        match created {
            None => MaterializeOutcome::Declined,
            Some(Ok(file)) => {
                self.host.index().reindex();
                let record = self.open(file, period, mode).await;
                on_open(&record);
                MaterializeOutcome::Created(record)
            }
            Some(Err(err)) => {
                let kind = period.granularity().adjective();
                error!(
                    "event=note_create module=materializer status=error kind={} path={} error={}",
                    kind, plan.path, err
                );
                self.host.notifier().report(
                    Severity::Error,
                    &format!("Failed to create {kind} note: {err}"),
                );
                MaterializeOutcome::Failed(err)
            }
        }
    }

    async fn create_note(
        &self,
        plan: &NotePlan,
        period: &Period,
    ) -> Result<FileRef, MaterializeError> {
        let vault = self.host.vault();

        FolderProvisioner::new(vault)
            .ensure(&plan.folder)
            .await
            .map_err(|source| MaterializeError::Folder {
                path: plan.folder.clone(),
                source,
            })?;

        let content = TemplateRenderer::new(vault)
            .render(&plan.template, &plan.folder, period)
            .await;

        match vault.create_file(&plan.path, &content).await {
            Ok(file) => {
                info!(
                    "event=note_create module=materializer status=ok path={} bytes={}",
                    file.path(),
                    content.len()
                );
                Ok(file)
            }
            Err(err) if err.is_already_exists() => {
                let existing = vault
                    .get_file_at(&plan.path)
                    .ok_or_else(|| MaterializeError::Unresolvable {
                        path: plan.path.clone(),
                    })?;
                info!(
                    "event=note_create module=materializer status=ok raced=true path={}",
                    existing.path()
                );
                Ok(existing)
            }
            Err(source) => Err(MaterializeError::Create {
                path: plan.path.clone(),
                source,
            }),
        }
    }

    async fn open(&self, file: FileRef, period: &Period, mode: OpenMode) -> NoteRecord {
        self.host.panes().open_file(&file, mode).await;
        info!(
            "event=note_open module=materializer status=ok path={} new_split={}",
            file.path(),
            mode.new_split
        );
        NoteRecord {
            file,
            period: *period,
        }
    }
}
