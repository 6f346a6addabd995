//! Payload diff engine.
//!
//! Compares two snapshot payloads and produces a deterministic, per-field
//! diff suitable for review screens, CLI output and change summaries.
//!
//! ## Entry point
//!
//! ```
//! use draftable_core::diff::{compare, format_human};
//! use draftable_core::payload::from_value;
//! use serde_json::json;
//!
//! let a = from_value(json!({"title": "A"})).unwrap();
//! let b = from_value(json!({"title": "B"})).unwrap();
//! let diff = compare(&a, &b);
//! assert_eq!(format_human(&diff)["title"], "Changed from 'A' to 'B'");
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: fields are reported in sorted key order.
//! - **Absent equals null**: a missing top-level key compares equal to an
//!   explicit `null`.
//! - **Symmetry**: `compare(b, a)` is `compare(a, b).mirrored()`.
//! - **Purity**: no I/O; versions and timestamps are never consulted.

pub mod engine;
pub mod human_summary;
pub mod model;

pub use engine::{
    classify, compare, compare_plain, compare_snapshots, compare_subjects, compare_with_subject,
    summarize, summary_between, values_equal,
};
pub use human_summary::{format_human, render_text, render_value, truncate_value};
pub use model::{ChangeKind, DiffSummary, FieldChange, PayloadDiff, PlainChange};
