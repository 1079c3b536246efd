// ── Response normalization ──
//
// Maps protocol-specific identifier and field conventions onto one
// canonical shape, so callers never care which protocol answered.
//
// REST payloads already use the device's hyphenated vocabulary; only the
// native `.id` key is copied to a canonical `id`. Legacy payloads pass
// through the sentence driver, whose attribute convention underscores
// field names -- those are rewritten to hyphens first, then the same
// `.id -> id` copy applies.

use serde_json::{Map, Value};

/// Canonical entity shape: field name to value, always carrying `id`.
pub type Entity = Map<String, Value>;

/// Which protocol produced a payload. Selected once at client
/// construction; business logic never branches on it elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Legacy,
    Rest,
}

/// The device's native identifier key.
const NATIVE_ID: &str = ".id";

/// Normalize a single raw entity.
pub fn normalize_entity(raw: Map<String, Value>, protocol: Protocol) -> Entity {
    let mut entity = Entity::with_capacity(raw.len() + 1);

    for (key, value) in raw {
        let key = match protocol {
            // Driver convention: underscores instead of the device's
            // hyphens. API-internal keys (leading dot) stay untouched.
            Protocol::Legacy if !key.starts_with('.') => key.replace('_', "-"),
            Protocol::Legacy | Protocol::Rest => key,
        };
        entity.insert(key, value);
    }

    if let Some(id) = entity.get(NATIVE_ID).cloned() {
        entity.insert("id".to_owned(), id);
    }
    entity
}

/// Normalize a raw payload: objects map to one entity, arrays map
/// element-wise with order preserved (it reflects device-reported
/// ordering, e.g. route priority). Scalars pass through untouched.
pub fn normalize_value(raw: Value, protocol: Protocol) -> Value {
    match raw {
        Value::Object(map) => Value::Object(normalize_entity(map, protocol)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| normalize_value(item, protocol))
                .collect(),
        ),
        other => other,
    }
}

/// Lift a legacy sentence record (string attributes) into a raw JSON map.
pub fn record_to_map(record: std::collections::HashMap<String, String>) -> Map<String, Value> {
    record
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}
