#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::Post;
use draftable_core::policy::FixedActor;
use draftable_core::store::InMemorySnapshotStore;
use draftable_core::subject::Draftable;
use draftable_core::DraftConfig;
use draftable_engine::{AutoSave, DraftManager};
use serde_json::json;

fn manager(auto_save_draft: bool, enabled: bool) -> DraftManager<InMemorySnapshotStore> {
    let config = DraftConfig {
        auto_save_draft,
        enabled,
        ..DraftConfig::default()
    };
    DraftManager::new(InMemorySnapshotStore::new(), config)
}

#[test]
fn test_auto_save_disabled_only_persists() {
    let mut manager = manager(false, true);
    let mut post = Post::new(1, json!({"title": "A"}));

    let outcome = AutoSave::new(&mut manager).persist(&mut post).unwrap();

    assert!(outcome.persisted);
    assert!(outcome.draft.is_none());
    assert_eq!(post.persist_calls, 1);
    assert!(!manager.has_drafts(&post.subject_ref()).unwrap());
}

#[test]
fn test_auto_save_captures_state_after_write() {
    // GIVEN auto-save configured and a provider-supplied actor
    let mut manager = manager(true, true).with_actor_provider(FixedActor(3));
    let mut post = Post::new(1, json!({"title": "A"}));
    post.set("title", json!("edited"));

    // WHEN the host persists through the wrapper
    let outcome = AutoSave::new(&mut manager).persist(&mut post).unwrap();

    // THEN a draft of the written state exists
    let draft = outcome.draft.expect("draft");
    assert_eq!(draft.version, 1);
    assert_eq!(draft.payload["title"], json!("edited"));
    assert_eq!(draft.created_by, Some(3));
    assert!(draft.is_unpublished());
}

#[test]
fn test_auto_save_explicit_actor_wins() {
    let mut manager = manager(true, true).with_actor_provider(FixedActor(3));
    let mut post = Post::new(1, json!({"title": "A"}));

    let outcome = AutoSave::new(&mut manager)
        .as_actor(11)
        .persist(&mut post)
        .unwrap();

    assert_eq!(outcome.draft.unwrap().created_by, Some(11));
}

#[test]
fn test_auto_save_skipped_when_feature_disabled() {
    let mut manager = manager(true, false);
    let mut post = Post::new(1, json!({"title": "A"}));

    let outcome = AutoSave::new(&mut manager).persist(&mut post).unwrap();

    assert!(outcome.persisted);
    assert!(outcome.draft.is_none());
}

#[test]
fn test_failed_persist_never_drafts() {
    let mut manager = manager(true, true);
    let mut post = Post::new(1, json!({"title": "A"}));
    post.fail_persist = true;

    let outcome = AutoSave::new(&mut manager).persist(&mut post).unwrap();

    assert!(!outcome.persisted);
    assert!(outcome.draft.is_none());
    assert!(!manager.has_drafts(&post.subject_ref()).unwrap());
}

#[test]
fn test_repeated_writes_number_drafts() {
    let mut manager = manager(true, true);
    let mut post = Post::new(1, json!({"title": "A"}));
    {
        let mut auto = AutoSave::new(&mut manager);
        auto.persist(&mut post).unwrap();
        post.set("title", json!("B"));
        auto.persist(&mut post).unwrap();
    }
    assert_eq!(manager.current_version(&post.subject_ref()).unwrap(), 2);
    assert!(manager.has_conflicts(&post.subject_ref()).unwrap());
}
