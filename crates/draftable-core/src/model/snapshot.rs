use chrono::{DateTime, Utc};
use draftable_core_types::{ActorId, SubjectRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{DraftError, Result};
use crate::payload::{self, Payload};

/// Snapshot - an immutable, numbered capture of a subject's payload
///
/// Snapshots start unpublished. Publishing sets `published_at` once; it is
/// never cleared afterwards. Apart from that transition the only mutation a
/// snapshot sees is an administrative payload correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Store-assigned identifier
    pub id: i64,

    /// Owning subject
    pub subject: SubjectRef,

    /// Captured field values
    pub payload: Payload,

    /// Version number, unique per subject and starting at 1
    pub version: u32,

    /// Actor that created the snapshot, if known
    pub created_by: Option<ActorId>,

    /// Publication timestamp; `None` while the snapshot is a draft
    pub published_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Snapshot {
    /// Check if this snapshot has been published
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    /// Check if this snapshot is still a draft
    pub fn is_unpublished(&self) -> bool {
        self.published_at.is_none()
    }

    /// Transition to published.
    ///
    /// # Errors
    ///
    /// `AlreadyPublished` if `published_at` is already set.
    pub fn mark_published(&mut self, at: DateTime<Utc>) -> Result<()> {
        if self.is_published() {
            return Err(DraftError::AlreadyPublished {
                snapshot_id: self.id,
            });
        }
        self.published_at = Some(at);
        self.updated_at = at;
        Ok(())
    }

    /// Read a payload value by dotted path (`"meta.tags.0"`).
    pub fn payload_value(&self, path: &str) -> Option<&Value> {
        payload::get_path(&self.payload, path)
    }

    /// Write a payload value by dotted path, creating intermediate objects.
    ///
    /// # Errors
    ///
    /// `InvalidPayloadPath` for empty segments or out-of-range array indexes.
    pub fn set_payload_value(&mut self, path: &str, value: Value) -> Result<()> {
        payload::set_path(&mut self.payload, path, value)
    }
}

/// A snapshot that has not been stored yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSnapshot {
    pub subject: SubjectRef,
    pub payload: Payload,
    pub version: u32,
    pub created_by: Option<ActorId>,
}

impl NewSnapshot {
    pub fn new(subject: SubjectRef, payload: Payload, version: u32) -> Self {
        Self {
            subject,
            payload,
            version,
            created_by: None,
        }
    }

    pub fn with_created_by(mut self, actor: Option<ActorId>) -> Self {
        self.created_by = actor;
        self
    }

    /// Materialize with a store-assigned id and creation time.
    pub fn into_snapshot(self, id: i64, now: DateTime<Utc>) -> Snapshot {
        Snapshot {
            id,
            subject: self.subject,
            payload: self.payload,
            version: self.version,
            created_by: self.created_by,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> Snapshot {
        let payload = payload::from_value(json!({"title": "A", "meta": {"tags": ["x"]}})).unwrap();
        NewSnapshot::new(SubjectRef::new("Post", 1), payload, 1)
            .with_created_by(Some(7))
            .into_snapshot(10, Utc::now())
    }

    #[test]
    fn test_new_snapshot_is_unpublished() {
        let s = snapshot();
        assert!(s.is_unpublished());
        assert!(!s.is_published());
        assert_eq!(s.created_by, Some(7));
        assert_eq!(s.created_at, s.updated_at);
    }

    #[test]
    fn test_mark_published_is_terminal() {
        let mut s = snapshot();
        let at = Utc::now();
        s.mark_published(at).unwrap();
        assert_eq!(s.published_at, Some(at));

        let err = s.mark_published(Utc::now()).unwrap_err();
        assert_eq!(err, DraftError::AlreadyPublished { snapshot_id: 10 });
        assert_eq!(s.published_at, Some(at));
    }

    #[test]
    fn test_payload_paths() {
        let mut s = snapshot();
        assert_eq!(s.payload_value("meta.tags.0"), Some(&json!("x")));
        s.set_payload_value("meta.seo.title", json!("T")).unwrap();
        assert_eq!(s.payload_value("meta.seo.title"), Some(&json!("T")));
        assert_eq!(s.payload_value("title"), Some(&json!("A")));
    }
}
