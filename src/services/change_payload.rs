//! Change payload codec.
//!
//! Payloads follow the postgres-changes shape:
//! `{"eventType": "INSERT"|"UPDATE"|"DELETE", "table": "...", "new": {row}, "old": {row}}`.
//! Decoding validates the row before anything reaches the local store.

use serde_json::{json, Map, Value};

use crate::types::bookmark::{BookmarkRecord, Category};
use crate::types::change::ChangeEvent;
use crate::types::errors::DecodeError;

/// Decodes one raw payload into a [`ChangeEvent`].
pub fn decode_change(payload: &Value) -> Result<ChangeEvent, DecodeError> {
    let event_type = payload
        .get("eventType")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingEventType)?;

    match event_type {
        "INSERT" => Ok(ChangeEvent::Created(decode_record(row(payload, "new")?)?)),
        "UPDATE" => Ok(ChangeEvent::Updated(decode_record(row(payload, "new")?)?)),
        "DELETE" => Ok(ChangeEvent::Deleted {
            id: decode_id(row(payload, "old")?)?,
        }),
        other => Err(DecodeError::UnknownEventType(other.to_string())),
    }
}

fn row<'a>(payload: &'a Value, key: &'static str) -> Result<&'a Map<String, Value>, DecodeError> {
    payload
        .get(key)
        .and_then(Value::as_object)
        .ok_or(DecodeError::MissingRow(key))
}

fn decode_id(row: &Map<String, Value>) -> Result<String, DecodeError> {
    let id = match row.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            return Err(DecodeError::InvalidField {
                field: "id",
                reason: "missing".to_string(),
            })
        }
    };
    if id.is_empty() {
        return Err(DecodeError::InvalidField {
            field: "id",
            reason: "empty".to_string(),
        });
    }
    Ok(id)
}

fn required_str(row: &Map<String, Value>, field: &'static str) -> Result<String, DecodeError> {
    row.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(DecodeError::InvalidField {
            field,
            reason: "expected a string".to_string(),
        })
}

fn decode_record(row: &Map<String, Value>) -> Result<BookmarkRecord, DecodeError> {
    let id = decode_id(row)?;
    let title = required_str(row, "title")?;
    if title.trim().is_empty() {
        return Err(DecodeError::InvalidField {
            field: "title",
            reason: "empty".to_string(),
        });
    }
    let url = required_str(row, "url")?;

    let category = match row.get("category") {
        None | Some(Value::Null) => Category::default(),
        Some(Value::String(s)) => s
            .parse::<Category>()
            .map_err(|reason| DecodeError::InvalidField {
                field: "category",
                reason,
            })?,
        Some(_) => {
            return Err(DecodeError::InvalidField {
                field: "category",
                reason: "expected a string".to_string(),
            })
        }
    };

    Ok(BookmarkRecord {
        id,
        title,
        url,
        category,
        owner: row.get("user_id").and_then(Value::as_str).map(str::to_string),
        created_at: row.get("created_at").and_then(Value::as_i64),
    })
}

fn record_row(record: &BookmarkRecord) -> Value {
    json!({
        "id": record.id,
        "title": record.title,
        "url": record.url,
        "category": record.category.as_str(),
        "user_id": record.owner,
        "created_at": record.created_at,
    })
}

/// Payload announcing that `record` was inserted into `table`.
pub fn insert_payload(table: &str, record: &BookmarkRecord) -> Value {
    json!({
        "eventType": "INSERT",
        "table": table,
        "new": record_row(record),
        "old": {},
    })
}

/// Payload announcing that the row `id` was deleted from `table`.
pub fn delete_payload(table: &str, id: &str) -> Value {
    json!({
        "eventType": "DELETE",
        "table": table,
        "new": {},
        "old": { "id": id },
    })
}
