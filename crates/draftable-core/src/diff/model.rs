//! Payload diff output types.
//!
//! Collections use `BTreeMap` for deterministic serialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Value-level classification of a field change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Old value absent/null, new value present
    Added,
    /// Old value present, new value absent/null
    Removed,
    /// Both present and different
    Modified,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
        }
    }

    /// The classification seen from the other side of the comparison.
    pub fn flipped(self) -> Self {
        match self {
            ChangeKind::Added => ChangeKind::Removed,
            ChangeKind::Removed => ChangeKind::Added,
            ChangeKind::Modified => ChangeKind::Modified,
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Old/new values for one changed field.
///
/// An absent field is represented as `Value::Null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldChange {
    pub old: Value,
    pub new: Value,
    pub kind: ChangeKind,
}

/// Old/new values without classification (legacy `compare_drafts` shape).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlainChange {
    pub old: Value,
    pub new: Value,
}

/// Field name → change, for every field whose value differs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PayloadDiff {
    changes: BTreeMap<String, FieldChange>,
}

impl PayloadDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, change: FieldChange) {
        self.changes.insert(field.into(), change);
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.changes.get(field)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changed field names, sorted.
    pub fn fields(&self) -> Vec<String> {
        self.changes.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldChange)> {
        self.changes.iter()
    }

    /// The same diff seen from the other side: old/new swapped and
    /// added/removed flipped.
    pub fn mirrored(&self) -> Self {
        let changes = self
            .changes
            .iter()
            .map(|(field, change)| {
                (
                    field.clone(),
                    FieldChange {
                        old: change.new.clone(),
                        new: change.old.clone(),
                        kind: change.kind.flipped(),
                    },
                )
            })
            .collect();
        Self { changes }
    }

    /// Drop the classification.
    pub fn into_plain(self) -> BTreeMap<String, PlainChange> {
        self.changes
            .into_iter()
            .map(|(field, change)| {
                (
                    field,
                    PlainChange {
                        old: change.old,
                        new: change.new,
                    },
                )
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a PayloadDiff {
    type Item = (&'a String, &'a FieldChange);
    type IntoIter = std::collections::btree_map::Iter<'a, String, FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

/// Aggregate view of a diff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffSummary {
    pub total_changes: usize,
    pub changed_fields: Vec<String>,
    pub has_changes: bool,
    /// Version of the left-hand snapshot, when the diff came from snapshots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_from: Option<u32>,
    /// Version of the right-hand snapshot, when the diff came from snapshots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_to: Option<u32>,
}
