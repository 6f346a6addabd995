//! Core types shared across Draftable crates
//!
//! This crate provides foundational types used by the domain, persistence
//! and logging layers:
//!
//! - **Subject identity**: [`SubjectRef`] (polymorphic `subject_type` + `subject_id`) and [`ActorId`]
//! - **Schema constants**: Canonical field keys and event names

pub mod schema;
pub mod subject;

pub use subject::{ActorId, SubjectRef};
