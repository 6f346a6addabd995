//! Snapshot store abstraction
//!
//! [`SnapshotStore`] is the persistence seam between the draft engine and a
//! backing store. The SQLite implementation lives in `draftable-store`;
//! [`InMemorySnapshotStore`] backs unit tests and embedded use.
//!
//! Stores report I/O failures as `Persistence` errors and never retry. A
//! duplicate (subject, version) insert fails with `VersionConflict`.

use chrono::{DateTime, Utc};
use draftable_core_types::SubjectRef;
use std::collections::BTreeMap;

use crate::errors::{ExError, ExErrorKind};
use crate::model::{NewSnapshot, Snapshot};
use crate::payload::Payload;

pub type StoreResult<T> = std::result::Result<T, ExError>;

/// Publication status filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublicationStatus {
    #[default]
    Any,
    Published,
    Unpublished,
}

/// Filter for administrative listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotFilter {
    /// Substring match on the subject type
    pub subject_type: Option<String>,
    pub status: PublicationStatus,
    pub limit: Option<usize>,
}

impl SnapshotFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject_type(mut self, subject_type: impl Into<String>) -> Self {
        self.subject_type = Some(subject_type.into());
        self
    }

    pub fn with_status(mut self, status: PublicationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a snapshot passes the type and status conditions (limit aside).
    pub fn matches(&self, snapshot: &Snapshot) -> bool {
        let type_ok = self
            .subject_type
            .as_deref()
            .map_or(true, |needle| snapshot.subject.subject_type.contains(needle));
        let status_ok = match self.status {
            PublicationStatus::Any => true,
            PublicationStatus::Published => snapshot.is_published(),
            PublicationStatus::Unpublished => snapshot.is_unpublished(),
        };
        type_ok && status_ok
    }
}

/// Persistence operations the draft engine needs.
///
/// `list_by_subject` returns versions in descending order. Age queries
/// compare `created_at` strictly before `cutoff`; when `keep_published` is
/// set, published snapshots are left out.
pub trait SnapshotStore {
    /// Insert a snapshot and return it with its assigned id and timestamps.
    fn insert(&mut self, snapshot: NewSnapshot) -> StoreResult<Snapshot>;

    fn find_by_id(&self, id: i64) -> StoreResult<Option<Snapshot>>;

    fn find_by_subject_and_version(
        &self,
        subject: &SubjectRef,
        version: u32,
    ) -> StoreResult<Option<Snapshot>>;

    /// All snapshots of a subject, newest version first.
    fn list_by_subject(&self, subject: &SubjectRef) -> StoreResult<Vec<Snapshot>>;

    fn latest_for_subject(&self, subject: &SubjectRef) -> StoreResult<Option<Snapshot>> {
        Ok(self.list_by_subject(subject)?.into_iter().next())
    }

    fn max_version(&self, subject: &SubjectRef) -> StoreResult<Option<u32>>;

    fn count_unpublished(&self, subject: &SubjectRef) -> StoreResult<usize>;

    /// Set `published_at` if the snapshot is still unpublished.
    ///
    /// Returns `false` when the row is missing or already published.
    fn mark_published(&mut self, id: i64, at: DateTime<Utc>) -> StoreResult<bool>;

    /// Overwrite a snapshot's payload (administrative correction).
    fn update_payload(&mut self, id: i64, payload: &Payload) -> StoreResult<bool>;

    fn delete_by_ids(&mut self, ids: &[i64]) -> StoreResult<usize>;

    fn count_older_than(&self, cutoff: DateTime<Utc>, keep_published: bool) -> StoreResult<usize>;

    /// Oldest-first sample of snapshots an age purge would remove.
    fn list_older_than(
        &self,
        cutoff: DateTime<Utc>,
        keep_published: bool,
        limit: usize,
    ) -> StoreResult<Vec<Snapshot>>;

    fn delete_older_than(&mut self, cutoff: DateTime<Utc>, keep_published: bool)
        -> StoreResult<usize>;

    /// Filtered listing, newest `created_at` first.
    fn list(&self, filter: &SnapshotFilter) -> StoreResult<Vec<Snapshot>>;

    fn begin(&mut self) -> StoreResult<()>;
    fn commit(&mut self) -> StoreResult<()>;
    fn rollback(&mut self) -> StoreResult<()>;
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    rows: BTreeMap<i64, Snapshot>,
    next_id: i64,
}

/// In-memory snapshot store.
///
/// `begin` saves a copy of the whole state; `rollback` restores it.
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotStore {
    state: MemoryState,
    saved: Option<MemoryState>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots across all subjects.
    pub fn len(&self) -> usize {
        self.state.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.rows.is_empty()
    }

    /// Whether a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.saved.is_some()
    }

    /// Backdate a snapshot's creation time (age-purge tests and imports).
    pub fn set_created_at(&mut self, id: i64, at: DateTime<Utc>) -> bool {
        match self.state.rows.get_mut(&id) {
            Some(row) => {
                row.created_at = at;
                true
            }
            None => false,
        }
    }

    fn subject_rows<'a>(&'a self, subject: &'a SubjectRef) -> impl Iterator<Item = &'a Snapshot> {
        self.state.rows.values().filter(move |s| &s.subject == subject)
    }

    fn aged<'a>(
        &'a self,
        cutoff: DateTime<Utc>,
        keep_published: bool,
    ) -> impl Iterator<Item = &'a Snapshot> {
        self.state
            .rows
            .values()
            .filter(move |s| s.created_at < cutoff && !(keep_published && s.is_published()))
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn insert(&mut self, snapshot: NewSnapshot) -> StoreResult<Snapshot> {
        if self
            .subject_rows(&snapshot.subject)
            .any(|s| s.version == snapshot.version)
        {
            return Err(ExError::new(ExErrorKind::VersionConflict)
                .with_op("insert_snapshot")
                .with_subject(snapshot.subject.clone())
                .with_version(snapshot.version)
                .with_message("version already exists for subject"));
        }
        self.state.next_id += 1;
        let stored = snapshot.into_snapshot(self.state.next_id, Utc::now());
        self.state.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn find_by_id(&self, id: i64) -> StoreResult<Option<Snapshot>> {
        Ok(self.state.rows.get(&id).cloned())
    }

    fn find_by_subject_and_version(
        &self,
        subject: &SubjectRef,
        version: u32,
    ) -> StoreResult<Option<Snapshot>> {
        Ok(self.subject_rows(subject).find(|s| s.version == version).cloned())
    }

    fn list_by_subject(&self, subject: &SubjectRef) -> StoreResult<Vec<Snapshot>> {
        let mut rows: Vec<Snapshot> = self.subject_rows(subject).cloned().collect();
        rows.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(rows)
    }

    fn max_version(&self, subject: &SubjectRef) -> StoreResult<Option<u32>> {
        Ok(self.subject_rows(subject).map(|s| s.version).max())
    }

    fn count_unpublished(&self, subject: &SubjectRef) -> StoreResult<usize> {
        Ok(self.subject_rows(subject).filter(|s| s.is_unpublished()).count())
    }

    fn mark_published(&mut self, id: i64, at: DateTime<Utc>) -> StoreResult<bool> {
        match self.state.rows.get_mut(&id) {
            Some(row) => Ok(row.mark_published(at).is_ok()),
            None => Ok(false),
        }
    }

    fn update_payload(&mut self, id: i64, payload: &Payload) -> StoreResult<bool> {
        match self.state.rows.get_mut(&id) {
            Some(row) => {
                row.payload = payload.clone();
                row.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_by_ids(&mut self, ids: &[i64]) -> StoreResult<usize> {
        Ok(ids
            .iter()
            .filter(|id| self.state.rows.remove(*id).is_some())
            .count())
    }

    fn count_older_than(&self, cutoff: DateTime<Utc>, keep_published: bool) -> StoreResult<usize> {
        Ok(self.aged(cutoff, keep_published).count())
    }

    fn list_older_than(
        &self,
        cutoff: DateTime<Utc>,
        keep_published: bool,
        limit: usize,
    ) -> StoreResult<Vec<Snapshot>> {
        let mut rows: Vec<Snapshot> = self.aged(cutoff, keep_published).cloned().collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        rows.truncate(limit);
        Ok(rows)
    }

    fn delete_older_than(
        &mut self,
        cutoff: DateTime<Utc>,
        keep_published: bool,
    ) -> StoreResult<usize> {
        let ids: Vec<i64> = self.aged(cutoff, keep_published).map(|s| s.id).collect();
        self.delete_by_ids(&ids)
    }

    fn list(&self, filter: &SnapshotFilter) -> StoreResult<Vec<Snapshot>> {
        let mut rows: Vec<Snapshot> = self
            .state
            .rows
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = filter.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    fn begin(&mut self) -> StoreResult<()> {
        if self.saved.is_some() {
            return Err(ExError::new(ExErrorKind::Transaction)
                .with_op("begin")
                .with_message("transaction already active"));
        }
        self.saved = Some(self.state.clone());
        Ok(())
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.saved.take().map(|_| ()).ok_or_else(|| {
            ExError::new(ExErrorKind::Transaction)
                .with_op("commit")
                .with_message("no active transaction")
        })
    }

    fn rollback(&mut self) -> StoreResult<()> {
        match self.saved.take() {
            Some(state) => {
                self.state = state;
                Ok(())
            }
            None => Err(ExError::new(ExErrorKind::Transaction)
                .with_op("rollback")
                .with_message("no active transaction")),
        }
    }
}
