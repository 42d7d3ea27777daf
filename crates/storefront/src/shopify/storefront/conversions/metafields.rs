//! Metafield flattening.
//!
//! Shopify hands metafields back in whatever shape the query asked for. Three
//! shapes occur and all flatten to `key -> value` with the namespace dropped:
//!
//! 1. `[{ "namespace": "custom", "key": "material", "value": "Silk" }, null]`
//! 2. `{ "custom": { "material": "Silk" } }` (inner values may be
//!    `{ "value": "Silk" }`)
//! 3. `{ "material": "Silk" }` or `{ "custom.material": "Silk" }`

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Flatten any supported metafield shape. Unknown shapes yield an empty map.
#[must_use]
pub fn flatten_metafields(metafields: &Value) -> BTreeMap<String, String> {
    match metafields {
        Value::Array(entries) => flatten_array(entries),
        Value::Object(map) => flatten_object(map),
        _ => BTreeMap::new(),
    }
}

fn flatten_array(entries: &[Value]) -> BTreeMap<String, String> {
    entries
        .iter()
        .filter_map(|entry| {
            let entry = entry.as_object()?;
            let key = entry.get("key")?.as_str()?;
            let value = scalar(entry.get("value")?)?;
            Some((key.to_string(), value))
        })
        .collect()
}

fn flatten_object(map: &Map<String, Value>) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    for (key, value) in map {
        match value {
            // { "custom": { "material": ... } }
            Value::Object(inner) if !inner.contains_key("value") => {
                for (inner_key, inner_value) in inner {
                    if let Some(v) = scalar(inner_value) {
                        flat.insert(inner_key.clone(), v);
                    }
                }
            }
            _ => {
                if let Some(v) = scalar(value) {
                    flat.insert(strip_namespace(key).to_string(), v);
                }
            }
        }
    }
    flat
}

/// `custom.material` -> `material`.
fn strip_namespace(key: &str) -> &str {
    key.rsplit_once('.').map_or(key, |(_, k)| k)
}

/// String form of a metafield value, unwrapping `{ "value": ... }`.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => map.get("value").and_then(scalar),
        Value::Null | Value::Array(_) => None,
    }
}
