//! Version sequencer

use draftable_core_types::SubjectRef;

use crate::errors::{ExError, ExErrorKind};
use crate::store::{SnapshotStore, StoreResult};

/// Next version for `subject`: highest stored version + 1, or 1.
///
/// Not atomic on its own. The store's uniqueness constraint on
/// (subject, version) catches a racing writer.
///
/// # Errors
///
/// Propagates store errors; `Internal` if the version space is exhausted.
pub fn next_version<S: SnapshotStore + ?Sized>(store: &S, subject: &SubjectRef) -> StoreResult<u32> {
    match store.max_version(subject)? {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or_else(|| {
            ExError::new(ExErrorKind::Internal)
                .with_op("next_version")
                .with_subject(subject.clone())
                .with_message("version space exhausted")
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewSnapshot;
    use crate::payload::Payload;
    use crate::store::InMemorySnapshotStore;

    #[test]
    fn test_first_version_is_one() {
        let store = InMemorySnapshotStore::new();
        assert_eq!(next_version(&store, &SubjectRef::new("Post", 1)).unwrap(), 1);
    }

    #[test]
    fn test_next_version_follows_max_with_gaps() {
        let mut store = InMemorySnapshotStore::new();
        let subject = SubjectRef::new("Post", 1);
        for version in [1, 2, 5] {
            store
                .insert(NewSnapshot::new(subject.clone(), Payload::new(), version))
                .unwrap();
        }
        assert_eq!(next_version(&store, &subject).unwrap(), 6);
        assert_eq!(next_version(&store, &SubjectRef::new("Post", 2)).unwrap(), 1);
    }
}
