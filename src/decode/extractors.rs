//! Item extractor strategies and record coercion
//!
//! Public data APIs wrap their items in several ways:
//!
//! ```text
//! {"response": {"body": {"items": {"item": [...]}, "totalCount": 250}}}
//! {"items": [...]}
//! [...]
//! ```
//!
//! Extractors locate the collection; [`coerce_items`] turns whatever was found
//! into flat records.

use super::types::ItemExtractor;
use crate::types::Record;
use serde_json::{Map, Value};
use tracing::debug;

static NULL_VALUE: Value = Value::Null;

// ============================================================================
// Extractors
// ============================================================================

/// `response.body.items` inside a data.go.kr style envelope
///
/// Matches whenever `response.body` is an object. A body without `items`
/// resolves to null, which coerces to zero records.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeItems;

impl ItemExtractor for EnvelopeItems {
    fn name(&self) -> &str {
        "response.body.items"
    }

    fn try_extract<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let body = document.get("response")?.get("body")?;
        if !body.is_object() {
            return None;
        }
        Some(body.get("items").unwrap_or(&NULL_VALUE))
    }
}

/// Top-level `items` field
#[derive(Debug, Clone, Copy, Default)]
pub struct TopLevelItems;

impl ItemExtractor for TopLevelItems {
    fn name(&self) -> &str {
        "items"
    }

    fn try_extract<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        document.as_object()?.get("items")
    }
}

/// The whole document is the item collection
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeDocument;

impl ItemExtractor for WholeDocument {
    fn name(&self) -> &str {
        "$"
    }

    fn try_extract<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        Some(document)
    }
}

/// Items at a configured dot-notation path (e.g. `data.rows`)
#[derive(Debug, Clone)]
pub struct PathItems {
    path: String,
}

impl PathItems {
    /// Create an extractor for a dot-notation path; a leading `$.` is ignored
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl ItemExtractor for PathItems {
    fn name(&self) -> &str {
        &self.path
    }

    fn try_extract<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let path = self.path.strip_prefix("$.").unwrap_or(&self.path);
        path.split('.')
            .filter(|part| !part.is_empty())
            .try_fold(document, |current, part| match current {
                Value::Object(map) => map.get(part),
                Value::Array(arr) => part.parse::<usize>().ok().and_then(|i| arr.get(i)),
                _ => None,
            })
    }
}

/// The default chain: envelope, then top-level `items`, then the whole document
pub fn default_extractors() -> Vec<Box<dyn ItemExtractor>> {
    vec![
        Box::new(EnvelopeItems),
        Box::new(TopLevelItems),
        Box::new(WholeDocument),
    ]
}

// ============================================================================
// Coercion
// ============================================================================

/// Turn a located item collection into records.
///
/// - arrays: one record per element, non-objects wrapped as `{"value": ..}`
/// - objects with an `item` key: recurse into that key
/// - other objects: a single record
/// - null and blank strings: no records
/// - other scalars: a single `{"value": ..}` record
pub fn coerce_items(items: &Value) -> Vec<Record> {
    match items {
        Value::Null => Vec::new(),
        Value::String(s) if s.trim().is_empty() => Vec::new(),
        Value::Array(elements) => elements
            .iter()
            .map(|element| match element {
                Value::Object(map) => flatten_record(map),
                other => wrap_scalar(other),
            })
            .collect(),
        Value::Object(map) => match map.get("item") {
            Some(inner) => coerce_items(inner),
            None => vec![flatten_record(map)],
        },
        other => vec![wrap_scalar(other)],
    }
}

/// Flatten one item object into a record.
///
/// Nested objects become dotted keys (`origin.code`), nested arrays are kept
/// as their compact JSON text. When a dotted key collides with a literal key
/// (`{"a": {"b": 1}, "a.b": 2}`), the field that comes later in the item
/// wins and keeps the column position of the first.
pub fn flatten_record(item: &Map<String, Value>) -> Record {
    let mut record = Record::new();
    for (key, value) in item {
        flatten_into(key, value, &mut record);
    }
    record
}

fn wrap_scalar(value: &Value) -> Record {
    let mut record = Record::new();
    flatten_into("value", value, &mut record);
    record
}

fn flatten_into(key: &str, value: &Value, out: &mut Record) {
    let flat = match value {
        Value::Object(map) if map.is_empty() => Value::Null,
        Value::Object(map) => {
            for (child, child_value) in map {
                flatten_into(&format!("{key}.{child}"), child_value, out);
            }
            return;
        }
        Value::Array(_) => Value::String(value.to_string()),
        scalar => scalar.clone(),
    };
    if out.insert(key.to_string(), flat).is_some() {
        debug!(key, "flattened key collides with an earlier field, later value kept");
    }
}

/// Read `response.body.totalCount` as a non-negative integer.
///
/// Numbers and numeric strings are accepted; anything else means the total
/// is unknown.
pub fn extract_total_count(document: &Value) -> Option<u64> {
    let total = document.get("response")?.get("body")?.get("totalCount")?;
    match total {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}
