#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use draftable_core::errors::{ExError, ExErrorKind};
use draftable_core::model::{NewSnapshot, Snapshot};
use draftable_core::payload::{from_value, Payload};
use draftable_core::store::{InMemorySnapshotStore, SnapshotFilter, SnapshotStore, StoreResult};
use draftable_core::subject::Draftable;
use draftable_core::SubjectRef;
use serde_json::{json, Value};

pub const POST_TYPE: &str = "App\\Models\\Post";

/// Fields a `Post` accepts from a payload
const SETTABLE: &[&str] = &["title", "body", "tag", "meta"];

/// Test subject backed by a field map, tracking what was last persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: i64,
    pub fields: Payload,
    pub saved: Payload,
    pub fail_persist: bool,
    pub persist_calls: usize,
}

impl Post {
    pub fn new(id: i64, fields: Value) -> Self {
        let fields = from_value(fields).unwrap();
        Self {
            id,
            saved: fields.clone(),
            fields,
            fail_persist: false,
            persist_calls: 0,
        }
    }

    pub fn subject(id: i64) -> SubjectRef {
        SubjectRef::new(POST_TYPE, id)
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
    }

    pub fn get(&self, field: &str) -> Value {
        self.fields.get(field).cloned().unwrap_or(Value::Null)
    }

    pub fn saved_value(&self, field: &str) -> Value {
        self.saved.get(field).cloned().unwrap_or(Value::Null)
    }
}

impl Draftable for Post {
    fn subject_ref(&self) -> SubjectRef {
        Post::subject(self.id)
    }

    /// Every settable field; unset fields report `null`.
    fn current_fields(&self) -> Payload {
        SETTABLE
            .iter()
            .map(|f| (f.to_string(), self.get(f)))
            .collect()
    }

    fn apply_payload(&mut self, payload: &Payload) {
        for field in SETTABLE {
            if let Some(value) = payload.get(*field) {
                if value.is_null() {
                    self.fields.remove(*field);
                } else {
                    self.fields.insert(field.to_string(), value.clone());
                }
            }
        }
    }

    fn persist(&mut self) -> bool {
        self.persist_calls += 1;
        if self.fail_persist {
            return false;
        }
        self.saved = self.fields.clone();
        true
    }
}

pub fn payload(value: Value) -> Payload {
    from_value(value).unwrap()
}

pub fn title_payload(title: &str) -> Payload {
    payload(json!({ "title": title }))
}

/// In-memory store with scripted interference.
#[derive(Default)]
pub struct ScriptedStore {
    pub inner: InMemorySnapshotStore,
    /// Inserts that lose a race: a competing writer takes the version first
    pub races: u32,
    pub fail_mark_published: bool,
    pub fail_insert: bool,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_races(races: u32) -> Self {
        Self {
            races,
            ..Self::default()
        }
    }
}

fn injected(op: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op(op.to_string())
        .with_message("injected failure")
}

impl SnapshotStore for ScriptedStore {
    fn insert(&mut self, snapshot: NewSnapshot) -> StoreResult<Snapshot> {
        if self.fail_insert {
            return Err(injected("insert_snapshot"));
        }
        if self.races > 0 {
            self.races -= 1;
            let competitor = NewSnapshot::new(
                snapshot.subject.clone(),
                payload(json!({"title": "competitor"})),
                snapshot.version,
            );
            self.inner.insert(competitor)?;
        }
        self.inner.insert(snapshot)
    }

    fn find_by_id(&self, id: i64) -> StoreResult<Option<Snapshot>> {
        self.inner.find_by_id(id)
    }

    fn find_by_subject_and_version(
        &self,
        subject: &SubjectRef,
        version: u32,
    ) -> StoreResult<Option<Snapshot>> {
        self.inner.find_by_subject_and_version(subject, version)
    }

    fn list_by_subject(&self, subject: &SubjectRef) -> StoreResult<Vec<Snapshot>> {
        self.inner.list_by_subject(subject)
    }

    fn max_version(&self, subject: &SubjectRef) -> StoreResult<Option<u32>> {
        self.inner.max_version(subject)
    }

    fn count_unpublished(&self, subject: &SubjectRef) -> StoreResult<usize> {
        self.inner.count_unpublished(subject)
    }

    fn mark_published(&mut self, id: i64, at: DateTime<Utc>) -> StoreResult<bool> {
        if self.fail_mark_published {
            return Err(injected("mark_published"));
        }
        self.inner.mark_published(id, at)
    }

    fn update_payload(&mut self, id: i64, payload: &Payload) -> StoreResult<bool> {
        self.inner.update_payload(id, payload)
    }

    fn delete_by_ids(&mut self, ids: &[i64]) -> StoreResult<usize> {
        self.inner.delete_by_ids(ids)
    }

    fn count_older_than(&self, cutoff: DateTime<Utc>, keep_published: bool) -> StoreResult<usize> {
        self.inner.count_older_than(cutoff, keep_published)
    }

    fn list_older_than(
        &self,
        cutoff: DateTime<Utc>,
        keep_published: bool,
        limit: usize,
    ) -> StoreResult<Vec<Snapshot>> {
        self.inner.list_older_than(cutoff, keep_published, limit)
    }

    fn delete_older_than(
        &mut self,
        cutoff: DateTime<Utc>,
        keep_published: bool,
    ) -> StoreResult<usize> {
        self.inner.delete_older_than(cutoff, keep_published)
    }

    fn list(&self, filter: &SnapshotFilter) -> StoreResult<Vec<Snapshot>> {
        self.inner.list(filter)
    }

    fn begin(&mut self) -> StoreResult<()> {
        self.inner.begin()
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.inner.commit()
    }

    fn rollback(&mut self) -> StoreResult<()> {
        self.inner.rollback()
    }
}
