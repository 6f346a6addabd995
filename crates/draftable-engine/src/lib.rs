//! Draftable Engine - Orchestration layer
//!
//! Coordinates the core versioning rules with a snapshot store:
//! - `DraftManager`: save, publish, restore, retention, conflicts
//! - `AutoSave`: draft-on-write wrapper around a subject's persist
//! - Administrative operations: listing, version diffs, age purges
//!
//! ## Logging Ownership
//!
//! The engine layer owns lifecycle logging for draft operations:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (store, core) use only `tracing::debug!()` for internal details.

pub mod admin;
pub mod auto_save;
pub mod manager;

pub use admin::{PurgeReport, VersionDiff};
pub use auto_save::{AutoSave, AutoSaveOutcome};
pub use draftable_store::errors::Result;
pub use manager::DraftManager;
