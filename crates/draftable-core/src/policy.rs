//! Notification hooks and actor resolution
//!
//! The engine calls a [`DraftEventHook`] after each committed state change
//! and consults an [`ActorProvider`] when a caller does not name the actor
//! creating a snapshot.

use draftable_core_types::{ActorId, SubjectRef};
use std::sync::{Arc, Mutex};

use crate::model::Snapshot;

/// State change notifications
#[derive(Debug, Clone, PartialEq)]
pub enum DraftEvent {
    DraftCreated {
        snapshot: Snapshot,
        subject: SubjectRef,
    },
    DraftPublished {
        snapshot: Snapshot,
        subject: SubjectRef,
    },
    VersionRestored {
        restored: Snapshot,
        created: Snapshot,
        subject: SubjectRef,
    },
}

impl DraftEvent {
    /// Stable event name (matches the config toggle key)
    pub fn name(&self) -> &'static str {
        match self {
            DraftEvent::DraftCreated { .. } => "draft_created",
            DraftEvent::DraftPublished { .. } => "draft_published",
            DraftEvent::VersionRestored { .. } => "version_restored",
        }
    }

    pub fn subject(&self) -> &SubjectRef {
        match self {
            DraftEvent::DraftCreated { subject, .. }
            | DraftEvent::DraftPublished { subject, .. }
            | DraftEvent::VersionRestored { subject, .. } => subject,
        }
    }
}

/// Receives draft events. Hooks must not fail the operation that fired them.
pub trait DraftEventHook: Send + Sync {
    fn on_event(&self, event: &DraftEvent);
}

/// Ignores every event (default).
pub struct NoopDraftEventHook;

impl DraftEventHook for NoopDraftEventHook {
    fn on_event(&self, _: &DraftEvent) {}
}

/// Collects events in memory; clones share the same buffer.
#[derive(Clone, Default)]
pub struct RecordingDraftEventHook {
    events: Arc<Mutex<Vec<DraftEvent>>>,
}

impl RecordingDraftEventHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DraftEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(DraftEvent::name).collect()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl DraftEventHook for RecordingDraftEventHook {
    fn on_event(&self, event: &DraftEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}

/// Supplies the current actor for snapshots created without one.
pub trait ActorProvider: Send + Sync {
    fn current_actor(&self) -> Option<ActorId>;
}

/// No authenticated actor (CLI default).
pub struct NoActor;

impl ActorProvider for NoActor {
    fn current_actor(&self) -> Option<ActorId> {
        None
    }
}

/// Always reports the same actor.
pub struct FixedActor(pub ActorId);

impl ActorProvider for FixedActor {
    fn current_actor(&self) -> Option<ActorId> {
        Some(self.0)
    }
}
