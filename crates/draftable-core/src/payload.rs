//! Snapshot payloads
//!
//! A payload is the field-name → value mapping captured in a snapshot.
//! Values are arbitrary JSON (scalars, nested objects, arrays). Keys are kept
//! in a `BTreeMap` so that serialization and diff output are deterministic.

use crate::errors::{DraftError, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// Field-name → value mapping captured in a snapshot
pub type Payload = BTreeMap<String, Value>;

/// Merge `additional` over `base`; keys in `additional` win.
pub fn merge(mut base: Payload, additional: &Payload) -> Payload {
    for (key, value) in additional {
        base.insert(key.clone(), value.clone());
    }
    base
}

/// Restrict a payload to the given field names.
pub fn only(payload: &Payload, fields: &[&str]) -> Payload {
    fields
        .iter()
        .filter_map(|f| payload.get(*f).map(|v| ((*f).to_string(), v.clone())))
        .collect()
}

/// Convert a JSON value into a payload.
///
/// `null` is treated as an empty payload; any other non-object is rejected.
pub fn from_value(value: Value) -> Result<Payload> {
    match value {
        Value::Null => Ok(Payload::new()),
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(DraftError::Serialization {
            message: format!("payload must be a JSON object, got {}", type_name(&other)),
        }),
    }
}

/// Convert a payload into a JSON object value.
pub fn to_value(payload: &Payload) -> Value {
    Value::Object(
        payload
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}

/// Read a value by dotted path (`"meta.tags.0"`).
///
/// Object segments are looked up by key, array segments by index.
pub fn get_path<'a>(payload: &'a Payload, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = payload.get(first)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Write a value by dotted path, creating intermediate objects.
///
/// Scalar intermediates are replaced by objects. Array segments must
/// address an existing index.
pub fn set_path(payload: &mut Payload, path: &str, value: Value) -> Result<()> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(DraftError::InvalidPayloadPath {
            path: path.to_string(),
            reason: "empty path segment".to_string(),
        });
    }

    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => {
            return Err(DraftError::InvalidPayloadPath {
                path: path.to_string(),
                reason: "empty path".to_string(),
            })
        }
    };

    if parents.is_empty() {
        payload.insert((*last).to_string(), value);
        return Ok(());
    }

    let root = payload
        .entry(parents[0].to_string())
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    let mut current = root;
    for segment in &parents[1..] {
        current = descend(current, segment, path)?;
    }

    match current {
        Value::Array(items) => {
            let slot = index_slot(items, last, path)?;
            *slot = value;
        }
        other => {
            if !other.is_object() {
                *other = Value::Object(serde_json::Map::new());
            }
            if let Value::Object(map) = other {
                map.insert((*last).to_string(), value);
            }
        }
    }
    Ok(())
}

fn descend<'a>(current: &'a mut Value, segment: &str, path: &str) -> Result<&'a mut Value> {
    if !current.is_object() && !current.is_array() {
        *current = Value::Object(serde_json::Map::new());
    }
    match current {
        Value::Array(items) => index_slot(items, segment, path),
        Value::Object(map) => Ok(map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()))),
        _ => Err(DraftError::Internal {
            message: "payload intermediate is not an object".to_string(),
        }),
    }
}

fn index_slot<'a>(items: &'a mut [Value], segment: &str, path: &str) -> Result<&'a mut Value> {
    let index = segment
        .parse::<usize>()
        .map_err(|_| DraftError::InvalidPayloadPath {
            path: path.to_string(),
            reason: format!("'{}' is not an array index", segment),
        })?;
    let len = items.len();
    items
        .get_mut(index)
        .ok_or_else(|| DraftError::InvalidPayloadPath {
            path: path.to_string(),
            reason: format!("index {} out of bounds (len {})", index, len),
        })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
