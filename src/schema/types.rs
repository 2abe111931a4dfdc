//! Schema profile types

use crate::types::format_float;
use serde::{Deserialize, Serialize};

/// Semantic type inferred for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    /// `YYYYMMDD`, `YYYYMM` or `YYYY-MM-DD`
    Date,
    Int,
    Float,
    String,
    /// No non-empty values to judge from
    Unknown,
}

impl InferredType {
    /// Whether min/max are numeric for this type
    pub fn is_numeric(self) -> bool {
        matches!(self, InferredType::Int | InferredType::Float)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InferredType::Date => "date",
            InferredType::Int => "int",
            InferredType::Float => "float",
            InferredType::String => "string",
            InferredType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for InferredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One end of a column's range.
///
/// The variant follows the column type: numbers for int/float columns,
/// the raw string for date columns and a character count for string columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Extremum {
    Number(f64),
    Length(usize),
    Text(String),
}

impl std::fmt::Display for Extremum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Extremum::Number(n) => f.write_str(&format_float(*n)),
            Extremum::Length(n) => write!(f, "{n}"),
            Extremum::Text(s) => f.write_str(s),
        }
    }
}

/// Summary of one field across a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Field name
    pub name: String,
    /// Inferred semantic type
    pub inferred_type: InferredType,
    /// Share of records where the field is absent or null, in `[0, 1]`
    pub missing_rate: f64,
    /// Number of distinct string representations among non-null values
    pub distinct_count: usize,
    /// Smallest value (see [`Extremum`])
    pub min: Option<Extremum>,
    /// Largest value (see [`Extremum`])
    pub max: Option<Extremum>,
}

/// Column profiles of one dataset, sorted by column name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaProfile {
    /// Number of records the profile was computed from
    pub record_count: usize,
    /// One profile per distinct field, ascending by name
    pub columns: Vec<ColumnProfile>,
}

impl SchemaProfile {
    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the profile has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Look up a column by name
    pub fn get(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns
            .binary_search_by(|c| c.name.as_str().cmp(name))
            .ok()
            .map(|idx| &self.columns[idx])
    }

    /// Iterate columns in name order
    pub fn iter(&self) -> std::slice::Iter<'_, ColumnProfile> {
        self.columns.iter()
    }

    /// Serialize to pretty JSON
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

impl<'a> IntoIterator for &'a SchemaProfile {
    type Item = &'a ColumnProfile;
    type IntoIter = std::slice::Iter<'a, ColumnProfile>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
