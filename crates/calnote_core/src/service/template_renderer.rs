//! Template lookup and date placeholder substitution.
//!
//! # Responsibility
//! - Resolve a configured template path with fallback probing.
//! - Substitute `{{date}}` / `{{date:FORMAT}}` tokens for one period.
//!
//! # Invariants
//! - A missing or unreadable template renders as empty content, never an error.
//! - Token payloads never contain `}`, so one match cannot span two tokens.

use crate::host::Vault;
use crate::model::note::{join_vault_path, FileRef};
use crate::model::period::Period;
use crate::service::folder_provisioner::normalize_folder;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;

/// Format used by `{{date}}` when no explicit format is given.
pub const DEFAULT_TEMPLATE_DATE_FORMAT: &str = "YYYY-MM-DD";

static DATE_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\{\{date(?::([^}]+))?\}\}").expect("valid date token regex"));

/// Reads templates through the vault and renders them for a period.
pub struct TemplateRenderer<'a, V: Vault> {
    vault: &'a V,
}

impl<'a, V: Vault> TemplateRenderer<'a, V> {
    pub fn new(vault: &'a V) -> Self {
        Self { vault }
    }

    /// Renders the template at `template_path` for `period`.
    ///
    /// `folder` is the note's target folder, probed last.
    pub async fn render(&self, template_path: &str, folder: &str, period: &Period) -> String {
        let template_path = template_path.trim();
        if template_path.is_empty() {
            return String::new();
        }

        let Some(template) = self.resolve(template_path, folder) else {
            warn!(
                "event=template_resolve module=template status=skip reason=not_found path={}",
                template_path
            );
            return String::new();
        };

        match self.vault.read_file(template.path()).await {
            Ok(content) => {
                debug!(
                    "event=template_resolve module=template status=ok path={}",
                    template.path()
                );
                substitute_date_tokens(&content, period)
            }
            Err(err) => {
                warn!(
                    "event=template_read module=template status=skip reason=read_failed path={} error={}",
                    template.path(),
                    err
                );
                String::new()
            }
        }
    }

    /// Probes, in order: the exact path, the path with `.md` appended when it
    /// has no extension, and the path under `folder`.
    pub fn resolve(&self, template_path: &str, folder: &str) -> Option<FileRef> {
        if let Some(found) = self.vault.get_file_at(template_path) {
            return Some(found);
        }

        if Path::new(template_path).extension().is_none() {
            if let Some(found) = self.vault.get_file_at(&format!("{template_path}.md")) {
                return Some(found);
            }
        }

        let folder = normalize_folder(folder);
        if folder.is_empty() {
            return None;
        }
        self.vault
            .get_file_at(&join_vault_path(folder, template_path))
    }
}

/// Replaces every date token in `content` with `period` formatted.
pub fn substitute_date_tokens(content: &str, period: &Period) -> String {
    DATE_TOKEN_RE
        .replace_all(content, |caps: &Captures<'_>| {
            let format = caps
                .get(1)
                .map_or(DEFAULT_TEMPLATE_DATE_FORMAT, |m| m.as_str());
            period.format(format)
        })
        .into_owned()
}
