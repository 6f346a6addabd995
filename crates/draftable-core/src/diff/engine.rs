//! Payload comparison engine.
//!
//! The core entry point is [`compare`], which accepts two payloads and
//! produces a [`PayloadDiff`] keyed by field name.

use crate::diff::model::{ChangeKind, DiffSummary, FieldChange, PayloadDiff, PlainChange};
use crate::model::Snapshot;
use crate::payload::Payload;
use crate::subject::Draftable;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Deep structural equality.
///
/// Objects are equal when they have the same key set and every entry is
/// recursively equal; arrays when they have the same length and equal
/// elements in order. Scalars compare by value, so `1` and `1.0` differ.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .all(|(key, value)| right.get(key).is_some_and(|other| values_equal(value, other)))
        }
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right.iter())
                    .all(|(value, other)| values_equal(value, other))
        }
        (left, right) => left == right,
    }
}

/// Classify a change between two values already known to differ.
pub fn classify(old: &Value, new: &Value) -> ChangeKind {
    match (old.is_null(), new.is_null()) {
        (true, _) => ChangeKind::Added,
        (false, true) => ChangeKind::Removed,
        (false, false) => ChangeKind::Modified,
    }
}

/// Compare two payloads.
///
/// Keys are the sorted union of both sides. A missing key is read as
/// `null`, so `{"a": null}` and `{}` compare equal.
pub fn compare(a: &Payload, b: &Payload) -> PayloadDiff {
    let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
    let mut diff = PayloadDiff::new();

    for key in keys {
        let old = a.get(key).unwrap_or(&Value::Null);
        let new = b.get(key).unwrap_or(&Value::Null);
        if values_equal(old, new) {
            continue;
        }
        diff.insert(
            key.clone(),
            FieldChange {
                old: old.clone(),
                new: new.clone(),
                kind: classify(old, new),
            },
        );
    }

    tracing::debug!(changed = diff.len(), "payload diff computed");
    diff
}

/// Compare two payloads without classifying each change.
pub fn compare_plain(a: &Payload, b: &Payload) -> BTreeMap<String, PlainChange> {
    compare(a, b).into_plain()
}

/// Compare the payloads of two snapshots (`a` is the old side).
pub fn compare_snapshots(a: &Snapshot, b: &Snapshot) -> PayloadDiff {
    compare(&a.payload, &b.payload)
}

/// Compare a snapshot against the subject's current draftable fields.
pub fn compare_with_subject(snapshot: &Snapshot, subject: &dyn Draftable) -> PayloadDiff {
    compare(&snapshot.payload, &subject.draft_payload(&Payload::new()))
}

/// Compare the current draftable fields of two subjects.
pub fn compare_subjects(a: &dyn Draftable, b: &dyn Draftable) -> PayloadDiff {
    let empty = Payload::new();
    compare(&a.draft_payload(&empty), &b.draft_payload(&empty))
}

/// Summarize a diff.
pub fn summarize(diff: &PayloadDiff) -> DiffSummary {
    DiffSummary {
        total_changes: diff.len(),
        changed_fields: diff.fields(),
        has_changes: !diff.is_empty(),
        version_from: None,
        version_to: None,
    }
}

/// Summarize the diff between two snapshots, including their versions.
pub fn summary_between(a: &Snapshot, b: &Snapshot) -> DiffSummary {
    DiffSummary {
        version_from: Some(a.version),
        version_to: Some(b.version),
        ..summarize(&compare_snapshots(a, b))
    }
}
