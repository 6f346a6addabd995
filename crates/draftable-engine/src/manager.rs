//! Draft manager
//!
//! State machine per snapshot: `Unpublished --publish--> Published`
//! (terminal). Publish and restore pair a subject write with a snapshot
//! write inside one store transaction. When the snapshot side fails after
//! the subject was persisted, the subject's pre-image is re-applied and
//! persisted before the transaction is rolled back.

use chrono::Utc;
use draftable_core::diff::{self, PlainChange};
use draftable_core::errors::{DraftError, ExError, ExErrorKind};
use draftable_core::model::{NewSnapshot, Snapshot};
use draftable_core::payload::Payload;
use draftable_core::policy::{ActorProvider, DraftEvent, DraftEventHook, NoActor, NoopDraftEventHook};
use draftable_core::sequencer::next_version;
use draftable_core::store::SnapshotStore;
use draftable_core::subject::{validate_subject, Draftable, SubjectLoader};
use draftable_core::{log_op_end, log_op_error, log_op_start, ActorId, DraftConfig, SubjectRef};
use draftable_store::SqliteSnapshotStore;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use crate::Result;

/// Attempts at inserting a snapshot before a version conflict is surfaced
const INSERT_ATTEMPTS: u32 = 2;

/// Orchestrates draft operations over a snapshot store.
///
/// Configuration, the notification hook and the current-actor provider are
/// fixed at construction.
pub struct DraftManager<St: SnapshotStore> {
    store: St,
    config: DraftConfig,
    hook: Box<dyn DraftEventHook>,
    actor: Box<dyn ActorProvider>,
}

impl DraftManager<SqliteSnapshotStore> {
    /// Open a SQLite-backed manager, migrating the configured table.
    pub fn open_sqlite<P: AsRef<Path>>(path: P, config: DraftConfig) -> Result<Self> {
        config.validate()?;
        let store = SqliteSnapshotStore::open(path, &config)?;
        Ok(Self::new(store, config))
    }
}

impl<St: SnapshotStore> DraftManager<St> {
    pub fn new(store: St, config: DraftConfig) -> Self {
        Self {
            store,
            config,
            hook: Box::new(NoopDraftEventHook),
            actor: Box::new(NoActor),
        }
    }

    pub fn with_hook(mut self, hook: impl DraftEventHook + 'static) -> Self {
        self.hook = Box::new(hook);
        self
    }

    pub fn with_actor_provider(mut self, provider: impl ActorProvider + 'static) -> Self {
        self.actor = Box::new(provider);
        self
    }

    pub fn config(&self) -> &DraftConfig {
        &self.config
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut St {
        &mut self.store
    }

    pub fn into_store(self) -> St {
        self.store
    }

    // ---------- Draft lifecycle ----------

    /// Capture the subject's draftable fields (merged with `additional`) as
    /// the next version.
    ///
    /// `actor` falls back to the injected actor provider.
    ///
    /// # Errors
    ///
    /// - `InvalidInput`: blank subject type
    /// - `Persistence`: store failure, or a version conflict that survived
    ///   the retry
    pub fn save_draft(
        &mut self,
        subject: &dyn Draftable,
        additional: &Payload,
        actor: Option<ActorId>,
    ) -> Result<Snapshot> {
        let subject_ref = subject.subject_ref();
        boundary("save_draft", &subject_ref, || {
            validate_subject(&subject_ref)?;
            let created_by = actor.or_else(|| self.actor.current_actor());
            let snapshot = self.insert_draft(subject, additional, created_by)?;
            self.emit(DraftEvent::DraftCreated {
                snapshot: snapshot.clone(),
                subject: subject_ref.clone(),
            });
            Ok(snapshot)
        })
    }

    /// Publish `snapshot` (or the latest snapshot) onto the subject.
    ///
    /// Returns `false` when nothing resolves, the snapshot is already
    /// published, or the subject refuses to persist.
    ///
    /// # Errors
    ///
    /// - `InvalidInput`: the snapshot belongs to another subject
    /// - `Persistence`: store failure (the subject is compensated first)
    pub fn publish_draft(
        &mut self,
        subject: &mut dyn Draftable,
        snapshot: Option<&Snapshot>,
    ) -> Result<bool> {
        let subject_ref = subject.subject_ref();
        boundary("publish_draft", &subject_ref, || {
            self.publish_draft_impl(subject, &subject_ref, snapshot)
        })
    }

    fn publish_draft_impl(
        &mut self,
        subject: &mut dyn Draftable,
        subject_ref: &SubjectRef,
        snapshot: Option<&Snapshot>,
    ) -> Result<bool> {
        validate_subject(subject_ref)?;

        // Re-read so a stale caller copy cannot publish twice.
        let target = match snapshot {
            Some(s) => self.store.find_by_id(s.id)?,
            None => self.store.latest_for_subject(subject_ref)?,
        };
        let Some(mut target) = target else {
            tracing::debug!(subject = %subject_ref, "no snapshot to publish");
            return Ok(false);
        };
        if &target.subject != subject_ref {
            return Err(DraftError::SubjectMismatch {
                snapshot_id: target.id,
                owner: target.subject.clone(),
                subject: subject_ref.clone(),
            }
            .into());
        }
        if target.is_published() {
            tracing::debug!(snapshot_id = target.id, "snapshot already published");
            return Ok(false);
        }

        self.store.begin()?;
        let pre_image = subject.current_fields();
        if !apply_and_persist(subject, &target.payload) {
            subject.apply_payload(&pre_image);
            self.store.rollback()?;
            tracing::debug!(snapshot_id = target.id, "subject persist failed, publish abandoned");
            return Ok(false);
        }

        let now = Utc::now();
        let marked = match self.store.mark_published(target.id, now) {
            Ok(true) => self.store.commit().map(|()| true),
            other => other,
        };
        match marked {
            Ok(true) => {}
            Ok(false) => {
                // Published by someone else between the read and the update.
                compensate(subject, &pre_image);
                self.store.rollback()?;
                return Ok(false);
            }
            Err(err) => {
                compensate(subject, &pre_image);
                self.rollback_quietly();
                return Err(err);
            }
        }

        target.published_at = Some(now);
        target.updated_at = now;
        self.emit(DraftEvent::DraftPublished {
            snapshot: target,
            subject: subject_ref.clone(),
        });
        Ok(true)
    }

    /// Apply version `version` to the subject and record the result as a
    /// new snapshot attributed to the current actor.
    ///
    /// Returns `false` when the version does not exist or the subject
    /// refuses to persist.
    ///
    /// # Errors
    ///
    /// `Persistence` on store failure (the subject is compensated first).
    pub fn restore_version(&mut self, subject: &mut dyn Draftable, version: u32) -> Result<bool> {
        let subject_ref = subject.subject_ref();
        boundary("restore_version", &subject_ref, || {
            self.restore_version_impl(subject, &subject_ref, version)
        })
    }

    fn restore_version_impl(
        &mut self,
        subject: &mut dyn Draftable,
        subject_ref: &SubjectRef,
        version: u32,
    ) -> Result<bool> {
        validate_subject(subject_ref)?;

        let Some(restored) = self
            .store
            .find_by_subject_and_version(subject_ref, version)?
        else {
            tracing::debug!(subject = %subject_ref, version, "version not found");
            return Ok(false);
        };

        self.store.begin()?;
        let pre_image = subject.current_fields();
        if !apply_and_persist(subject, &restored.payload) {
            subject.apply_payload(&pre_image);
            self.store.rollback()?;
            return Ok(false);
        }

        let actor = self.actor.current_actor();
        let created = self
            .insert_draft(&*subject, &Payload::new(), actor)
            .and_then(|created| self.store.commit().map(|()| created));
        let created = match created {
            Ok(created) => created,
            Err(err) => {
                compensate(subject, &pre_image);
                self.rollback_quietly();
                return Err(err);
            }
        };

        self.emit(DraftEvent::DraftCreated {
            snapshot: created.clone(),
            subject: subject_ref.clone(),
        });
        self.emit(DraftEvent::VersionRestored {
            restored,
            created,
            subject: subject_ref.clone(),
        });
        Ok(true)
    }

    /// Publish the latest snapshot when auto-publish is configured and
    /// that snapshot is still a draft.
    ///
    /// # Errors
    ///
    /// Propagates `publish_draft` errors.
    pub fn auto_publish_drafts(&mut self, subject: &mut dyn Draftable) -> Result<bool> {
        if !self.config.auto_publish {
            return Ok(false);
        }
        match self.store.latest_for_subject(&subject.subject_ref())? {
            Some(latest) if latest.is_unpublished() => self.publish_draft(subject, Some(&latest)),
            _ => Ok(false),
        }
    }

    /// Apply a snapshot to the subject it belongs to, resolved via `loader`.
    ///
    /// Returns `false` when the loader cannot resolve the subject or the
    /// subject fails to persist. The snapshot's state is not changed.
    pub fn apply_to_subject(&self, snapshot: &Snapshot, loader: &dyn SubjectLoader) -> bool {
        match loader.load(&snapshot.subject) {
            Some(mut subject) => apply_and_persist(subject.as_mut(), &snapshot.payload),
            None => {
                tracing::debug!(subject = %snapshot.subject, "subject loader returned nothing");
                false
            }
        }
    }

    /// Detached copy of the subject with the snapshot's payload applied.
    /// Nothing is persisted.
    pub fn preview_draft<S: Draftable + Clone>(&self, subject: &S, snapshot: &Snapshot) -> S {
        let mut preview = subject.clone();
        preview.apply_payload(&snapshot.payload);
        preview
    }

    /// Field-level differences between two snapshots, without change kinds.
    pub fn compare_drafts(&self, a: &Snapshot, b: &Snapshot) -> BTreeMap<String, PlainChange> {
        diff::compare_plain(&a.payload, &b.payload)
    }

    // ---------- Retention ----------

    /// Keep the `max_versions` highest versions of the subject and delete
    /// the rest. `max_versions <= 0` deletes nothing.
    ///
    /// # Errors
    ///
    /// `Persistence` on store failure.
    pub fn cleanup_old_drafts(&mut self, subject: &SubjectRef, max_versions: i64) -> Result<usize> {
        boundary("cleanup_old_drafts", subject, || {
            if max_versions <= 0 {
                return Ok(0);
            }
            let keep = usize::try_from(max_versions).unwrap_or(usize::MAX);
            let doomed: Vec<i64> = self
                .store
                .list_by_subject(subject)?
                .into_iter()
                .skip(keep)
                .map(|s| s.id)
                .collect();
            if doomed.is_empty() {
                return Ok(0);
            }
            self.store.delete_by_ids(&doomed)
        })
    }

    /// `cleanup_old_drafts` with the configured `max_versions`.
    ///
    /// # Errors
    ///
    /// `Persistence` on store failure.
    pub fn enforce_max_versions(&mut self, subject: &SubjectRef) -> Result<usize> {
        let max_versions = i64::from(self.config.max_versions);
        self.cleanup_old_drafts(subject, max_versions)
    }

    // ---------- Queries ----------

    /// All snapshots of the subject, newest version first.
    pub fn get_draft_history(&self, subject: &SubjectRef) -> Result<Vec<Snapshot>> {
        self.store.list_by_subject(subject)
    }

    /// More than one unpublished snapshot exists.
    pub fn has_conflicts(&self, subject: &SubjectRef) -> Result<bool> {
        Ok(self.store.count_unpublished(subject)? > 1)
    }

    pub fn latest_draft(&self, subject: &SubjectRef) -> Result<Option<Snapshot>> {
        self.store.latest_for_subject(subject)
    }

    pub fn has_drafts(&self, subject: &SubjectRef) -> Result<bool> {
        Ok(self.store.max_version(subject)?.is_some())
    }

    pub fn has_unpublished_drafts(&self, subject: &SubjectRef) -> Result<bool> {
        Ok(self.store.count_unpublished(subject)? > 0)
    }

    /// A subject is a draft while it has unpublished snapshots.
    pub fn is_draft(&self, subject: &SubjectRef) -> Result<bool> {
        self.has_unpublished_drafts(subject)
    }

    /// Highest stored version, 0 when none.
    pub fn current_version(&self, subject: &SubjectRef) -> Result<u32> {
        Ok(self.store.max_version(subject)?.unwrap_or(0))
    }

    pub fn published_drafts(&self, subject: &SubjectRef) -> Result<Vec<Snapshot>> {
        Ok(self
            .store
            .list_by_subject(subject)?
            .into_iter()
            .filter(Snapshot::is_published)
            .collect())
    }

    pub fn unpublished_drafts(&self, subject: &SubjectRef) -> Result<Vec<Snapshot>> {
        Ok(self
            .store
            .list_by_subject(subject)?
            .into_iter()
            .filter(Snapshot::is_unpublished)
            .collect())
    }

    // ---------- Internals ----------

    /// Insert at the next version, retrying once on a version conflict.
    fn insert_draft(
        &mut self,
        subject: &dyn Draftable,
        additional: &Payload,
        created_by: Option<ActorId>,
    ) -> Result<Snapshot> {
        let subject_ref = subject.subject_ref();
        let payload = subject.draft_payload(additional);

        let mut attempt = 1;
        loop {
            let version = next_version(&self.store, &subject_ref)?;
            let new = NewSnapshot::new(subject_ref.clone(), payload.clone(), version)
                .with_created_by(created_by);
            match self.store.insert(new) {
                Ok(snapshot) => return Ok(snapshot),
                Err(err) if err.kind() == ExErrorKind::VersionConflict => {
                    if attempt >= INSERT_ATTEMPTS {
                        return Err(ExError::new(ExErrorKind::Persistence)
                            .with_op("save_draft")
                            .with_subject(subject_ref.clone())
                            .with_version(version)
                            .with_message("version conflict persisted after retry")
                            .with_source(err));
                    }
                    tracing::debug!(subject = %subject_ref, version, "version conflict, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn emit(&self, event: DraftEvent) {
        if self.config.events.is_enabled(event.name()) {
            self.hook.on_event(&event);
        } else {
            tracing::debug!(event = event.name(), "event disabled by configuration");
        }
    }

    fn rollback_quietly(&mut self) {
        if let Err(err) = self.store.rollback() {
            tracing::warn!(err_code = err.code(), "rollback failed: {}", err);
        }
    }
}

fn apply_and_persist(subject: &mut dyn Draftable, payload: &Payload) -> bool {
    subject.apply_payload(payload);
    subject.persist()
}

/// Put the subject back to its pre-image and persist it.
fn compensate(subject: &mut dyn Draftable, pre_image: &Payload) {
    if !apply_and_persist(subject, pre_image) {
        tracing::warn!(subject = %subject.subject_ref(), "compensating persist failed");
    }
}

/// Start/end/error logging around one operation.
fn boundary<T>(
    op: &'static str,
    subject: &SubjectRef,
    body: impl FnOnce() -> Result<T>,
) -> Result<T> {
    log_op_start!(
        op,
        subject_type = subject.subject_type.as_str(),
        subject_id = subject.subject_id
    );
    let start = Instant::now();
    let result = body();
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => {
            log_op_end!(op, duration_ms = duration_ms);
        }
        Err(err) => {
            log_op_error!(op, err.clone(), duration_ms = duration_ms);
        }
    }
    result
}
