//! Reactive stores shared by calendar surfaces.
//!
//! # Responsibility
//! - Hold the authoritative settings snapshot and fan out changes.
//! - Track the file last opened through the calendar.
//!
//! # Invariants
//! - Values are replaced wholesale; readers see either the old or the new
//!   snapshot, never a mix.
//! - Listeners run synchronously in registration order.

pub mod active_file;
pub mod config_store;
mod listeners;

pub use listeners::Subscription;
