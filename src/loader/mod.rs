//! YAML Loader module
//!
//! Parse collection definitions from YAML files.
//!
//! # Overview
//!
//! The loader module provides:
//! - Built-in collection lookup by name
//! - YAML parsing into [`CollectionConfig`](crate::config::CollectionConfig)
//! - Validation of endpoints, pagination and warehouse mappings

mod parser;

pub use parser::{load_collection, load_collection_from_str, validate_collection};

#[cfg(test)]
mod tests;
