//! Output module
//!
//! Handles CSV output of collected datasets and their schema profiles.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Writing datasets with a header of all observed columns
//! - Writing sample files with the first rows of a dataset
//! - Writing per-endpoint and combined schema summaries

mod writer;

pub use writer::{
    summary_row, write_records, CsvSink, CsvWriterConfig, WrittenFiles, ALL_SUMMARY_FILE,
    SUMMARY_HEADER,
};
