#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::Post;
use draftable_core::payload::Payload;
use draftable_core::store::InMemorySnapshotStore;
use draftable_core::subject::Draftable;
use draftable_core::DraftConfig;
use draftable_engine::DraftManager;
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn prop_versions_strictly_increase(saves in 1usize..20) {
        let mut manager = DraftManager::new(InMemorySnapshotStore::new(), DraftConfig::default());
        let post = Post::new(1, json!({"title": "p"}));
        let mut last = 0;
        for _ in 0..saves {
            let snapshot = manager.save_draft(&post, &Payload::new(), None).unwrap();
            prop_assert!(snapshot.version > last);
            last = snapshot.version;
        }
        prop_assert_eq!(last as usize, saves);
    }

    #[test]
    fn prop_cleanup_keeps_highest_versions(saves in 0usize..15, keep in -3i64..12) {
        let mut manager = DraftManager::new(InMemorySnapshotStore::new(), DraftConfig::default());
        let post = Post::new(1, json!({"title": "p"}));
        for _ in 0..saves {
            manager.save_draft(&post, &Payload::new(), None).unwrap();
        }

        let deleted = manager.cleanup_old_drafts(&post.subject_ref(), keep).unwrap();

        let remaining: Vec<u32> = manager
            .get_draft_history(&post.subject_ref())
            .unwrap()
            .iter()
            .map(|s| s.version)
            .collect();
        let expected_kept = if keep <= 0 { saves } else { saves.min(keep as usize) };
        prop_assert_eq!(remaining.len(), expected_kept);
        prop_assert_eq!(deleted, saves - expected_kept);
        let expected: Vec<u32> = (1..=saves as u32).rev().take(expected_kept).collect();
        prop_assert_eq!(remaining, expected);
    }
}
