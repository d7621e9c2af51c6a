//! Unit tests for change payload decoding.

use rstest::rstest;
use serde_json::{json, Value};
use smart_bookmarks::services::change_payload::{decode_change, delete_payload, insert_payload};
use smart_bookmarks::types::bookmark::{BookmarkRecord, Category};
use smart_bookmarks::types::change::ChangeEvent;
use smart_bookmarks::types::errors::DecodeError;

fn insert(row: Value) -> Value {
    json!({ "eventType": "INSERT", "table": "bookmarks", "new": row, "old": {} })
}

#[test]
fn test_decode_insert_with_all_fields() {
    let payload = insert(json!({
        "id": "b1",
        "title": "Rust Book",
        "url": "https://doc.rust-lang.org/book",
        "category": "Learning",
        "user_id": "u1",
        "created_at": 1_700_000_000,
    }));

    let event = decode_change(&payload).unwrap();
    let ChangeEvent::Created(record) = event else {
        panic!("expected a created event, got {:?}", event);
    };
    assert_eq!(record.id, "b1");
    assert_eq!(record.title, "Rust Book");
    assert_eq!(record.category, Category::Learning);
    assert_eq!(record.owner.as_deref(), Some("u1"));
    assert_eq!(record.created_at, Some(1_700_000_000));
}

#[test]
fn test_missing_or_null_category_defaults_to_general() {
    let a = decode_change(&insert(json!({"id": "1", "title": "A", "url": "u"}))).unwrap();
    let b = decode_change(&insert(json!({"id": "2", "title": "B", "url": "u", "category": null}))).unwrap();
    for event in [a, b] {
        match event {
            ChangeEvent::Created(r) => assert_eq!(r.category, Category::General),
            other => panic!("unexpected {:?}", other),
        }
    }
}

#[test]
fn test_numeric_id_is_accepted() {
    let event = decode_change(&insert(json!({"id": 42, "title": "A", "url": "u"}))).unwrap();
    assert_eq!(
        event,
        ChangeEvent::Created(BookmarkRecord::new("42", "A", "u", Category::General))
    );
}

#[test]
fn test_decode_update_reads_new_row() {
    let payload = json!({
        "eventType": "UPDATE",
        "new": {"id": "1", "title": "Renamed", "url": "https://x.dev", "category": "Tools"},
        "old": {"id": "1"},
    });
    assert_eq!(
        decode_change(&payload).unwrap(),
        ChangeEvent::Updated(BookmarkRecord::new("1", "Renamed", "https://x.dev", Category::Tools))
    );
}

#[test]
fn test_decode_delete_needs_only_old_id() {
    let payload = json!({"eventType": "DELETE", "old": {"id": "gone"}});
    assert_eq!(
        decode_change(&payload).unwrap(),
        ChangeEvent::Deleted { id: "gone".to_string() }
    );
}

#[rstest]
#[case(json!({"table": "bookmarks"}), DecodeError::MissingEventType)]
#[case(json!({"eventType": 7}), DecodeError::MissingEventType)]
#[case(json!({"eventType": "TRUNCATE"}), DecodeError::UnknownEventType("TRUNCATE".to_string()))]
#[case(json!({"eventType": "INSERT"}), DecodeError::MissingRow("new"))]
#[case(json!({"eventType": "INSERT", "new": []}), DecodeError::MissingRow("new"))]
#[case(json!({"eventType": "DELETE", "new": {"id": "1"}}), DecodeError::MissingRow("old"))]
fn test_structural_errors(#[case] payload: Value, #[case] expected: DecodeError) {
    assert_eq!(decode_change(&payload).unwrap_err(), expected);
}

#[rstest]
#[case(json!({"title": "A", "url": "u"}), "id")]
#[case(json!({"id": "", "title": "A", "url": "u"}), "id")]
#[case(json!({"id": true, "title": "A", "url": "u"}), "id")]
#[case(json!({"id": "1", "url": "u"}), "title")]
#[case(json!({"id": "1", "title": "   ", "url": "u"}), "title")]
#[case(json!({"id": "1", "title": "A"}), "url")]
#[case(json!({"id": "1", "title": "A", "url": 3}), "url")]
#[case(json!({"id": "1", "title": "A", "url": "u", "category": "Misc"}), "category")]
#[case(json!({"id": "1", "title": "A", "url": "u", "category": 1}), "category")]
fn test_invalid_row_fields(#[case] row: Value, #[case] bad_field: &str) {
    match decode_change(&insert(row)) {
        Err(DecodeError::InvalidField { field, .. }) => assert_eq!(field, bad_field),
        other => panic!("expected invalid '{}', got {:?}", bad_field, other),
    }
}

#[test]
fn test_delete_with_empty_id_is_rejected() {
    let payload = json!({"eventType": "DELETE", "old": {"id": ""}});
    assert!(matches!(
        decode_change(&payload),
        Err(DecodeError::InvalidField { field: "id", .. })
    ));
}

#[test]
fn test_built_payloads_decode_to_matching_events() {
    let mut record = BookmarkRecord::new("abc", "Crates", "https://crates.io", Category::Tools);
    record.owner = Some("u1".to_string());
    record.created_at = Some(10);

    assert_eq!(
        decode_change(&insert_payload("bookmarks", &record)).unwrap(),
        ChangeEvent::Created(record)
    );
    assert_eq!(
        decode_change(&delete_payload("bookmarks", "abc")).unwrap(),
        ChangeEvent::Deleted { id: "abc".to_string() }
    );
}
