//! Subject capability
//!
//! A subject is the live record being versioned. The engine never touches a
//! subject's fields directly; it goes through [`Draftable`].

use draftable_core_types::SubjectRef;

use crate::errors::{DraftError, Result};
use crate::payload::{self, Payload};

/// Contract a host record satisfies to be versioned.
///
/// The trait is object safe so that a [`SubjectLoader`] can hand back
/// `Box<dyn Draftable>` for any subject type it knows about.
pub trait Draftable {
    /// Polymorphic identity `(subject_type, subject_id)`.
    fn subject_ref(&self) -> SubjectRef;

    /// Every settable field with its current value.
    fn current_fields(&self) -> Payload;

    /// Allow-list of fields captured in drafts; `None` captures every
    /// settable field.
    fn draftable_fields(&self) -> Option<&[&'static str]> {
        None
    }

    /// Draftable fields merged with `additional` (additional wins).
    fn draft_payload(&self, additional: &Payload) -> Payload {
        let fields = self.current_fields();
        let base = match self.draftable_fields() {
            Some(allow) => payload::only(&fields, allow),
            None => fields,
        };
        payload::merge(base, additional)
    }

    /// Update recognized fields from `payload`; unknown keys are ignored.
    fn apply_payload(&mut self, payload: &Payload);

    /// Persist the subject. Returns `false` on failure, never panics.
    fn persist(&mut self) -> bool;
}

/// Resolves a subject reference back to a concrete subject.
pub trait SubjectLoader {
    fn load(&self, subject: &SubjectRef) -> Option<Box<dyn Draftable>>;
}

impl<F> SubjectLoader for F
where
    F: Fn(&SubjectRef) -> Option<Box<dyn Draftable>>,
{
    fn load(&self, subject: &SubjectRef) -> Option<Box<dyn Draftable>> {
        self(subject)
    }
}

/// Reject identities that cannot key a snapshot.
///
/// # Errors
///
/// `InvalidSubject` when the subject type is blank.
pub fn validate_subject(subject: &SubjectRef) -> Result<()> {
    if subject.subject_type.trim().is_empty() {
        return Err(DraftError::InvalidSubject {
            reason: "subject type must not be empty".to_string(),
        });
    }
    Ok(())
}
