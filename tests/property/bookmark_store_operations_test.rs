//! Property-based tests for LocalBookmarkStore operations.
//!
//! For arbitrary sequences of inserts and removes, the store never holds an
//! id twice, and its contents equal a straightforward replay of the same
//! operations against an ordered model.

use proptest::prelude::*;
use smart_bookmarks::managers::bookmark_store::LocalBookmarkStore;
use smart_bookmarks::types::bookmark::{BookmarkRecord, Category};

#[derive(Debug, Clone)]
enum Op {
    Insert(u8),
    Remove(u8),
}

/// Small id space so inserts and removes collide often.
fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..8).prop_map(Op::Insert),
        (0u8..8).prop_map(Op::Remove),
    ]
}

fn record(n: u8) -> BookmarkRecord {
    BookmarkRecord::new(
        &n.to_string(),
        &format!("Bookmark {}", n),
        &format!("https://site{}.dev", n),
        Category::ALL[n as usize % Category::ALL.len()],
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn store_matches_model_and_ids_stay_unique(ops in proptest::collection::vec(arb_op(), 0..60)) {
        let mut store = LocalBookmarkStore::new();
        let mut model: Vec<u8> = Vec::new();

        for op in &ops {
            match op {
                Op::Insert(n) => {
                    let inserted = store.insert_if_absent(record(*n));
                    prop_assert_eq!(inserted, !model.contains(n));
                    if !model.contains(n) {
                        model.push(*n);
                    }
                }
                Op::Remove(n) => {
                    let removed = store.remove(&n.to_string()).is_some();
                    prop_assert_eq!(removed, model.contains(n));
                    model.retain(|m| m != n);
                }
            }
        }

        let got: Vec<String> = store.current_view().iter().map(|r| r.id.clone()).collect();
        let want: Vec<String> = model.iter().map(|n| n.to_string()).collect();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn repeated_insert_equals_single_insert(
        seed in proptest::collection::vec(0u8..8, 0..10),
        n in 0u8..8,
    ) {
        let mut once = LocalBookmarkStore::new();
        let mut twice = LocalBookmarkStore::new();
        let snapshot: Vec<BookmarkRecord> = seed.iter().map(|s| record(*s)).collect();
        once.initialize(snapshot.clone());
        twice.initialize(snapshot);

        once.insert_if_absent(record(n));
        twice.insert_if_absent(record(n));
        twice.insert_if_absent(record(n));

        prop_assert_eq!(once.current_view(), twice.current_view());
    }

    #[test]
    fn remove_of_absent_id_leaves_store_unchanged(
        seed in proptest::collection::vec(0u8..8, 0..10),
    ) {
        let mut store = LocalBookmarkStore::new();
        store.initialize(seed.iter().map(|s| record(*s)).collect());
        let before = store.current_view().to_vec();

        prop_assert!(store.remove("absent").is_none());
        prop_assert_eq!(store.current_view(), before.as_slice());
    }
}
