//! Draftable Store - SQLite persistence for snapshots
//!
//! Provides:
//! - Connection management (`db`)
//! - Embedded, checksummed migrations rendered for the configured table
//! - `SqliteSnapshotStore`, the `SnapshotStore` implementation on SQLite

pub mod db;
pub mod errors;
pub mod migrations;
pub mod sqlite_store;

// Re-export key types
pub use errors::Result;
pub use sqlite_store::SqliteSnapshotStore;
