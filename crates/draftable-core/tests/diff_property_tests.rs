#![allow(clippy::unwrap_used, clippy::expect_used)]

use draftable_core::diff::{compare, summarize, values_equal, ChangeKind};
use draftable_core::payload::Payload;
use proptest::prelude::*;
use serde_json::{json, Value};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-c]", inner, 0..3)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn payload() -> impl Strategy<Value = Payload> {
    prop::collection::btree_map("[a-e]", value(), 0..5)
}

proptest! {
    #[test]
    fn compare_with_self_is_empty(a in payload()) {
        prop_assert!(compare(&a, &a).is_empty());
    }

    #[test]
    fn compare_is_mirrored_when_swapped(a in payload(), b in payload()) {
        prop_assert_eq!(compare(&b, &a), compare(&a, &b).mirrored());
    }

    #[test]
    fn every_reported_field_really_differs(a in payload(), b in payload()) {
        let diff = compare(&a, &b);
        for (field, change) in &diff {
            prop_assert!(!values_equal(&change.old, &change.new));
            prop_assert_eq!(&change.old, a.get(field).unwrap_or(&Value::Null));
            prop_assert_eq!(&change.new, b.get(field).unwrap_or(&Value::Null));
            match change.kind {
                ChangeKind::Added => prop_assert!(change.old.is_null()),
                ChangeKind::Removed => prop_assert!(change.new.is_null()),
                ChangeKind::Modified => {
                    prop_assert!(!change.old.is_null() && !change.new.is_null())
                }
            }
        }
    }

    #[test]
    fn summary_matches_diff(a in payload(), b in payload()) {
        let diff = compare(&a, &b);
        let summary = summarize(&diff);
        prop_assert_eq!(summary.total_changes, diff.len());
        prop_assert_eq!(summary.has_changes, !diff.is_empty());
        prop_assert_eq!(summary.changed_fields, diff.fields());
    }
}

#[test]
fn test_empty_payloads_compare_equal() {
    assert!(compare(&Payload::new(), &Payload::new()).is_empty());
}
