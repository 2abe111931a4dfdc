//! Column type inference from string values
//!
//! Government API columns often carry a stray placeholder in an otherwise
//! numeric or date column, so types are decided by majority ratio rather than
//! unanimity. Rules are checked in order: date, then number (int or float),
//! then string.

use super::types::InferredType;
use regex::Regex;
use std::sync::LazyLock;

/// Minimum share of date-shaped values for a `date` column
pub const DATE_RATIO_THRESHOLD: f64 = 0.9;

/// Minimum share of number-shaped values for a numeric column
pub const NUMERIC_RATIO_THRESHOLD: f64 = 0.9;

/// Minimum share of integer-shaped values for a numeric column to be `int`
pub const INTEGER_RATIO_THRESHOLD: f64 = 0.9;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("number pattern is valid"));

static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+$").expect("integer pattern is valid"));

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{8}|\d{6}|\d{4}-\d{2}-\d{2})$").expect("date pattern is valid")
});

/// Plain decimal literal: optional minus, digits, optional fraction
pub fn is_number_shaped(value: &str) -> bool {
    NUMBER_RE.is_match(value)
}

/// Optional minus followed by digits only
pub fn is_integer_shaped(value: &str) -> bool {
    INTEGER_RE.is_match(value)
}

/// `YYYYMMDD`, `YYYYMM` or `YYYY-MM-DD` (shape only, not calendar-checked)
pub fn is_date_shaped(value: &str) -> bool {
    DATE_RE.is_match(value)
}

/// Ratio-based type inferrer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeInferrer {
    date_ratio: f64,
    numeric_ratio: f64,
    integer_ratio: f64,
}

impl Default for TypeInferrer {
    fn default() -> Self {
        Self {
            date_ratio: DATE_RATIO_THRESHOLD,
            numeric_ratio: NUMERIC_RATIO_THRESHOLD,
            integer_ratio: INTEGER_RATIO_THRESHOLD,
        }
    }
}

impl TypeInferrer {
    /// Create an inferrer with the default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the date ratio threshold
    #[must_use]
    pub fn with_date_ratio(mut self, ratio: f64) -> Self {
        self.date_ratio = ratio;
        self
    }

    /// Set the numeric ratio threshold
    #[must_use]
    pub fn with_numeric_ratio(mut self, ratio: f64) -> Self {
        self.numeric_ratio = ratio;
        self
    }

    /// Set the integer ratio threshold
    #[must_use]
    pub fn with_integer_ratio(mut self, ratio: f64) -> Self {
        self.integer_ratio = ratio;
        self
    }

    /// Classify a column from its values.
    ///
    /// Nulls are dropped, values trimmed and empty strings dropped before
    /// any ratio is computed. A column with nothing left is `unknown`.
    pub fn infer<I, S>(&self, values: I) -> InferredType
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let mut total = 0usize;
        let mut dates = 0usize;
        let mut numbers = 0usize;
        let mut integers = 0usize;

        for value in values.into_iter().flatten() {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            total += 1;
            if is_date_shaped(value) {
                dates += 1;
            }
            if is_number_shaped(value) {
                numbers += 1;
                if is_integer_shaped(value) {
                    integers += 1;
                }
            }
        }

        if total == 0 {
            return InferredType::Unknown;
        }

        let ratio = |count: usize| count as f64 / total as f64;

        if ratio(dates) >= self.date_ratio {
            InferredType::Date
        } else if ratio(numbers) >= self.numeric_ratio {
            if ratio(integers) >= self.integer_ratio {
                InferredType::Int
            } else {
                InferredType::Float
            }
        } else {
            InferredType::String
        }
    }
}

/// Classify a column with the default thresholds (convenience function)
pub fn infer_type<I, S>(values: I) -> InferredType
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    TypeInferrer::new().infer(values)
}
