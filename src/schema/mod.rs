//! Schema profiling module
//!
//! Infers a semantic type per column from its string values and profiles a
//! whole dataset.
//!
//! # Features
//!
//! - **Type Inference**: date / int / float / string / unknown by majority ratio
//! - **Missing Rate**: share of records without a value, sparse fields included
//! - **Cardinality**: distinct non-null values per column
//! - **Extrema**: numeric, lexicographic or length bounds depending on type

mod inference;
mod summary;
mod types;

pub use inference::{
    infer_type, is_date_shaped, is_integer_shaped, is_number_shaped, TypeInferrer,
    DATE_RATIO_THRESHOLD, INTEGER_RATIO_THRESHOLD, NUMERIC_RATIO_THRESHOLD,
};
pub use summary::{summarize, Summarizer};
pub use types::{ColumnProfile, Extremum, InferredType, SchemaProfile};
