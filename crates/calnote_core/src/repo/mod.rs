//! Persistence implementations backed by SQLite.
//!
//! # Responsibility
//! - Store the settings blob under a stable key.
//! - Keep SQL details out of the settings store.

pub mod settings_repo;
