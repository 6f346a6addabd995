//! Migration framework
//!
//! Provides:
//! - Migration runner with checksums and idempotent application
//! - Embedded SQL migrations, rendered per snapshot table

mod checksums;
mod embedded;
mod runner;

pub use runner::{applied_migrations, apply_migrations};
