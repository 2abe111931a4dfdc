//! Common types used throughout agri-explorer
//!
//! This module contains the tabular data model shared by the normalizer,
//! the paginator, the summarizer and the sinks.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// One flat item of an API response: field name to scalar value.
///
/// Field order follows the source item (serde_json is built with
/// `preserve_order`).
pub type Record = serde_json::Map<String, JsonValue>;

/// All records collected from one endpoint, in page order
pub type Dataset = Vec<Record>;

// ============================================================================
// Response Format Selector
// ============================================================================

/// Response format requested from the API (`returnType` query parameter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReturnType {
    #[default]
    Json,
    Xml,
}

impl ReturnType {
    /// Value sent on the wire
    pub fn as_param(self) -> &'static str {
        match self {
            ReturnType::Json => "JSON",
            ReturnType::Xml => "XML",
        }
    }
}

impl std::fmt::Display for ReturnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_param())
    }
}

// ============================================================================
// Value Helpers
// ============================================================================

/// String representation of a record value; `None` for null.
///
/// Strings are returned as-is, everything else uses its JSON text.
pub fn value_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Decimal text of a float; whole numbers keep one decimal (`3.0`)
pub fn format_float(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.1}")
    } else {
        n.to_string()
    }
}

/// Union of field names across records, in first-seen order
pub fn column_order(records: &[Record]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for record in records {
        for key in record.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }
    }
    columns
}
