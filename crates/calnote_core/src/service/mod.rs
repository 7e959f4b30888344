//! Periodic-note use-case services.
//!
//! # Responsibility
//! - Orchestrate host collaborators into find-or-create flows.
//! - Keep UI surfaces decoupled from file-system details.
//!
//! # Invariants
//! - Services never panic on host failures; user-facing failures become one
//!   notice through `Notifier`.

pub mod click_router;
pub mod folder_provisioner;
pub mod indicators;
pub mod interaction_gate;
pub mod note_materializer;
pub mod template_renderer;
