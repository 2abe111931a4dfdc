// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # agri-explorer
//!
//! Collector and schema profiler for paginated public agricultural-market
//! REST APIs (data.go.kr).
//!
//! ## Features
//!
//! - **Response Normalization**: JSON envelopes, bare arrays and XML `<item>` lists become flat records
//! - **Pagination**: `pageNo` / `numOfRows` with `totalCount`, short-page and empty-page termination
//! - **Type Inference**: date / int / float / string by ratio thresholds
//! - **Schema Profiles**: missing rate, cardinality and extrema per column
//! - **Sinks**: CSV files (UTF-8 with BOM) and a DuckDB, MySQL or PostgreSQL warehouse
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use agri_explorer::{decode::normalize, schema::summarize, Result};
//!
//! fn main() -> Result<()> {
//!     let body = std::fs::read_to_string("perDay_price.json")?;
//!     let records = normalize(&body, Some("application/json"))?;
//!     let profile = summarize(&records);
//!     println!("{}", profile.to_json_pretty());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Collector                              │
//! │  for each endpoint: paginate → summarize → CSV → warehouse      │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   HTTP   │ Paginate  │   Normalize   │  Schema   │   Sinks     │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ GET      │ pageNo    │ JSON envelope │ Inference │ CSV + BOM   │
//! │ Timeout  │ totalCount│ Bare items    │ Missing   │ DuckDB      │
//! │ Key/type │ Page cap  │ XML <item>    │ Extrema   │ MySQL / PG  │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP page fetcher
pub mod http;

/// Page-number pagination
pub mod pagination;

/// Response normalizer (JSON, XML)
pub mod decode;

/// CSV output
pub mod output;

/// Multi-endpoint collector
pub mod engine;

/// Collection configuration
pub mod config;

/// YAML loader for collection definitions
pub mod loader;

/// Command-line interface
pub mod cli;

/// Type inference and schema profiles
pub mod schema;

/// Built-in collection definitions
pub mod connectors;

/// Warehouse sink via DuckDB
pub mod warehouse;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{CollectionConfig, Endpoint};
pub use loader::{load_collection, load_collection_from_str};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
