#![allow(clippy::unwrap_used, clippy::expect_used)]

use draftable_core::errors::{DraftError, ExError, ExErrorKind};
use draftable_core::SubjectRef;

#[test]
fn test_version_not_found_verifiable_by_kind() {
    let err = DraftError::VersionNotFound {
        subject: SubjectRef::new("App\\Models\\Post", 1),
        version: 4,
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.code(), "ERR_NOT_FOUND");
    assert_eq!(ex_err.version(), Some(4));
    assert_eq!(ex_err.message(), "Version 4 not found for App\\Models\\Post #1");
}

#[test]
fn test_already_published_distinct_from_invalid_input() {
    let ex_err: ExError = DraftError::AlreadyPublished { snapshot_id: 12 }.into();

    assert_eq!(ex_err.kind(), ExErrorKind::AlreadyPublished);
    assert_eq!(ex_err.code(), "ERR_ALREADY_PUBLISHED");
    assert_ne!(ex_err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(ex_err.snapshot_id(), Some(12));
}

#[test]
fn test_subject_mismatch_structured_fields() {
    let err = DraftError::SubjectMismatch {
        snapshot_id: 3,
        owner: SubjectRef::new("Post", 2),
        subject: SubjectRef::new("Post", 1),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(ex_err.subject(), Some(&SubjectRef::new("Post", 1)));
    assert!(ex_err.message().contains("Post #2"));
}

#[test]
fn test_invalid_retention_message() {
    let ex_err: ExError = DraftError::InvalidRetention {
        name: "days".to_string(),
        value: -3,
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(ex_err.message(), "days must be positive, got -3");
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ExErrorKind::VersionConflict, "ERR_VERSION_CONFLICT"),
        (ExErrorKind::AlreadyPublished, "ERR_ALREADY_PUBLISHED"),
        (ExErrorKind::Transaction, "ERR_TRANSACTION"),
        (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
        (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
        (ExErrorKind::Config, "ERR_CONFIG"),
        (ExErrorKind::Internal, "ERR_INTERNAL"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}

#[test]
fn test_serde_errors_become_serialization() {
    let serde_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let ex_err: ExError = DraftError::from(serde_err).into();
    assert_eq!(ex_err.kind(), ExErrorKind::Serialization);
}
