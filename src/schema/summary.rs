//! Dataset profiling
//!
//! Date extrema are plain lexicographic comparisons of the raw strings. They
//! are correct for a single date width, but a column mixing `YYYYMM` with
//! `YYYY-MM-DD` values can report misleading bounds.

use super::inference::TypeInferrer;
use super::types::{ColumnProfile, Extremum, InferredType, SchemaProfile};
use crate::types::{value_text, Record};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Computes a [`SchemaProfile`] for a dataset
#[derive(Debug, Clone, Default)]
pub struct Summarizer {
    inferrer: TypeInferrer,
}

impl Summarizer {
    /// Create a summarizer with the default inference thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Profile every field observed in `records`.
    ///
    /// Columns are the union of all record fields; a field absent from a
    /// record counts as missing for that record.
    pub fn summarize(&self, records: &[Record]) -> SchemaProfile {
        // Non-null value texts per column, BTreeMap keeps names sorted
        let mut columns: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for record in records {
            for (name, value) in record {
                let values = columns.entry(name.as_str()).or_default();
                if let Some(text) = value_text(value) {
                    values.push(text);
                }
            }
        }

        let total = records.len();
        let columns: Vec<ColumnProfile> = columns
            .into_iter()
            .map(|(name, values)| self.profile_column(name, &values, total))
            .collect();

        debug!(
            records = total,
            columns = columns.len(),
            "summarized dataset"
        );

        SchemaProfile {
            record_count: total,
            columns,
        }
    }

    fn profile_column(&self, name: &str, values: &[String], total: usize) -> ColumnProfile {
        let inferred_type = self.inferrer.infer(values.iter().map(Some));
        let distinct_count = values.iter().collect::<HashSet<_>>().len();
        let (min, max) = extrema(inferred_type, values);

        ColumnProfile {
            name: name.to_string(),
            inferred_type,
            missing_rate: missing_rate(values.len(), total),
            distinct_count,
            min,
            max,
        }
    }
}

/// Share of records lacking a value, rounded to 4 decimals
fn missing_rate(present: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = 1.0 - present as f64 / total as f64;
    (rate * 10_000.0).round() / 10_000.0
}

fn extrema(kind: InferredType, values: &[String]) -> (Option<Extremum>, Option<Extremum>) {
    match kind {
        InferredType::Int | InferredType::Float => {
            let numbers = values
                .iter()
                .filter_map(|v| v.trim().parse::<f64>().ok())
                .filter(|n| n.is_finite());
            fold_extrema(numbers, |a, b| a.total_cmp(b), Extremum::Number)
        }
        InferredType::Date => {
            let dates = values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty());
            fold_extrema(dates, |a, b| a.cmp(b), |s| Extremum::Text(s.to_string()))
        }
        InferredType::String => {
            let lengths = values.iter().map(|v| v.chars().count());
            fold_extrema(lengths, Ord::cmp, Extremum::Length)
        }
        InferredType::Unknown => (None, None),
    }
}

fn fold_extrema<T, I, C, F>(items: I, cmp: C, wrap: F) -> (Option<Extremum>, Option<Extremum>)
where
    T: Clone,
    I: Iterator<Item = T>,
    C: Fn(&T, &T) -> std::cmp::Ordering,
    F: Fn(T) -> Extremum,
{
    let mut bounds: Option<(T, T)> = None;
    for item in items {
        bounds = Some(match bounds {
            None => (item.clone(), item),
            Some((lo, hi)) => {
                let lo = if cmp(&item, &lo).is_lt() { item.clone() } else { lo };
                let hi = if cmp(&item, &hi).is_gt() { item } else { hi };
                (lo, hi)
            }
        });
    }
    match bounds {
        Some((lo, hi)) => (Some(wrap(lo)), Some(wrap(hi))),
        None => (None, None),
    }
}

/// Profile a dataset with default thresholds (convenience function)
pub fn summarize(records: &[Record]) -> SchemaProfile {
    Summarizer::new().summarize(records)
}
