//! Confirm-before-create gate.

use crate::host::{ConfirmDialog, ConfirmPrompt};
use log::info;
use std::future::Future;

/// Runs a mutating action only after the user accepts, unless bypassed.
pub struct InteractionGate<'a, D: ConfirmDialog> {
    dialog: &'a D,
}

impl<'a, D: ConfirmDialog> InteractionGate<'a, D> {
    pub fn new(dialog: &'a D) -> Self {
        Self { dialog }
    }

    /// Shows `prompt` and runs `on_accept` only on explicit accept.
    ///
    /// Returns `None` on dismiss; nothing else happens in that case.
    pub async fn confirm<F, Fut>(&self, prompt: &ConfirmPrompt, on_accept: F) -> Option<Fut::Output>
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        if self.dialog.ask(prompt).await {
            Some(on_accept().await)
        } else {
            info!(
                "event=confirm module=gate status=declined title={}",
                prompt.title
            );
            None
        }
    }

    /// Like `confirm`, but skips the dialog when `required` is false.
    pub async fn confirm_if<F, Fut>(
        &self,
        required: bool,
        prompt: &ConfirmPrompt,
        on_accept: F,
    ) -> Option<Fut::Output>
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        if required {
            self.confirm(prompt, on_accept).await
        } else {
            Some(on_accept().await)
        }
    }
}

/// Prompt shown before a missing periodic note is created.
pub fn creation_prompt(note_kind: &str, file_name: &str) -> ConfirmPrompt {
    ConfirmPrompt {
        title: format!("New {note_kind} Note"),
        text: format!("File {file_name} does not exist. Would you like to create it?"),
        cta: "Create".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::creation_prompt;

    #[test]
    fn creation_prompt_names_the_missing_file() {
        let prompt = creation_prompt("Weekly", "2024-W11");
        assert_eq!(prompt.title, "New Weekly Note");
        assert_eq!(
            prompt.text,
            "File 2024-W11 does not exist. Would you like to create it?"
        );
        assert_eq!(prompt.cta, "Create");
    }
}
