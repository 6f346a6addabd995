//! Draft-on-write wrapper
//!
//! Hosts route their writes through [`AutoSave::persist`] instead of calling
//! `Draftable::persist` directly. After a successful persist, and only when
//! both `enabled` and `auto_save_draft` are configured, the new state is
//! captured as a draft.

use draftable_core::model::Snapshot;
use draftable_core::payload::Payload;
use draftable_core::store::SnapshotStore;
use draftable_core::subject::Draftable;
use draftable_core::ActorId;

use crate::manager::DraftManager;
use crate::Result;

/// Result of an auto-saving persist
#[derive(Debug, Clone, PartialEq)]
pub struct AutoSaveOutcome {
    /// What the subject's own persist returned
    pub persisted: bool,
    /// Draft captured after the write, if auto-save ran
    pub draft: Option<Snapshot>,
}

pub struct AutoSave<'m, St: SnapshotStore> {
    manager: &'m mut DraftManager<St>,
    actor: Option<ActorId>,
}

impl<'m, St: SnapshotStore> AutoSave<'m, St> {
    pub fn new(manager: &'m mut DraftManager<St>) -> Self {
        Self {
            manager,
            actor: None,
        }
    }

    /// Attribute auto-saved drafts to `actor` instead of the provider's actor.
    pub fn as_actor(mut self, actor: ActorId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Persist the subject, then save a draft if auto-save is active.
    ///
    /// A failed persist never creates a draft.
    ///
    /// # Errors
    ///
    /// Propagates `save_draft` errors; the subject write is not undone.
    pub fn persist(&mut self, subject: &mut dyn Draftable) -> Result<AutoSaveOutcome> {
        if !subject.persist() {
            return Ok(AutoSaveOutcome {
                persisted: false,
                draft: None,
            });
        }

        let draft = if self.manager.config().auto_save_active() {
            Some(
                self.manager
                    .save_draft(&*subject, &Payload::new(), self.actor)?,
            )
        } else {
            None
        };

        Ok(AutoSaveOutcome {
            persisted: true,
            draft,
        })
    }
}
