//! Calendar settings: schema and durable storage contract.
//!
//! # Responsibility
//! - Define the one canonical settings record and its partial patch shape.
//! - Hydrate persisted blobs over hard-coded defaults.
//!
//! # See also
//! - `store::config_store` for the live, versioned holder.

pub mod persistence;
pub mod schema;
