//! Calendar-facing value types.
//!
//! # Responsibility
//! - Define the `Period` unit that every note lookup is keyed on.
//! - Render periods through moment-compatible format strings.
//! - Describe resolved files (`FileRef`, `NoteRecord`).
//!
//! # Invariants
//! - A `Period` is always a valid calendar date; week periods are anchored on
//!   the first day of their week.
//! - `NoteRecord` is never cached beyond one lookup-or-create call.

pub mod date_format;
pub mod note;
pub mod period;
