//! Subject identity types
//!
//! A snapshot store serves many kinds of records. Each snapshot is keyed by
//! the owning record's type name and numeric id rather than by a typed
//! reference, so one table can hold drafts for articles, profiles, etc.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the actor (user) that created a snapshot.
pub type ActorId = i64;

/// Polymorphic reference to a versioned record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectRef {
    pub subject_type: String,
    pub subject_id: i64,
}

impl SubjectRef {
    pub fn new(subject_type: impl Into<String>, subject_id: i64) -> Self {
        Self {
            subject_type: subject_type.into(),
            subject_id,
        }
    }

    /// Short type name, i.e. the last `::` or `\` separated segment.
    ///
    /// Hosts often register fully-qualified type names; listings show the
    /// short form.
    pub fn short_type(&self) -> &str {
        self.subject_type
            .rsplit(|c| c == ':' || c == '\\')
            .next()
            .unwrap_or(&self.subject_type)
    }
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.subject_type, self.subject_id)
    }
}
