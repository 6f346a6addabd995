//! Draftable Core - versioning and diff kernel
//!
//! This crate provides the storage-independent pieces of the draft engine:
//! - Structured error and logging facilities
//! - Payload helpers and the payload diff engine
//! - The snapshot model and the `Draftable` subject capability
//! - The `SnapshotStore` seam with an in-memory implementation
//! - Version sequencing, notification hooks and configuration

pub mod config;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod payload;
pub mod policy;
pub mod sequencer;
pub mod store;
pub mod subject;

#[doc(hidden)]
pub use draftable_core_types::schema as __schema;

// Re-export commonly used types
pub use config::DraftConfig;
pub use draftable_core_types::{ActorId, SubjectRef};
pub use errors::{DraftError, ExError, ExErrorKind, Result};
pub use model::{NewSnapshot, Snapshot};
pub use payload::Payload;
pub use policy::{ActorProvider, DraftEvent, DraftEventHook, NoActor, NoopDraftEventHook};
pub use store::{InMemorySnapshotStore, SnapshotStore, StoreResult};
pub use subject::{Draftable, SubjectLoader};
