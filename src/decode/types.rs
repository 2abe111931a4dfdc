//! Decoder types and traits
//!
//! Defines the core decoder abstractions.

use crate::error::Result;
use crate::types::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Format of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    /// JSON format (default)
    #[default]
    Json,
    /// XML format
    Xml,
}

impl PayloadFormat {
    /// Decide how to read a body.
    ///
    /// A declared content type mentioning "json" wins; otherwise a body whose
    /// trimmed text starts with `{` or `[` is JSON. Everything else is XML.
    pub fn detect(body: &str, content_type: Option<&str>) -> Self {
        if content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json")) {
            return PayloadFormat::Json;
        }
        let trimmed = body.trim_start_matches('\u{feff}').trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            PayloadFormat::Json
        } else {
            PayloadFormat::Xml
        }
    }

    /// Name used in error messages
    pub fn label(self) -> &'static str {
        match self {
            PayloadFormat::Json => "JSON",
            PayloadFormat::Xml => "XML",
        }
    }
}

/// Records of one response page plus the metadata pagination needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedPage {
    /// Format the body was read as
    pub format: PayloadFormat,
    /// Extracted records, in document order
    pub records: Vec<Record>,
    /// Declared total item count (`response.body.totalCount`), if any
    pub total_count: Option<u64>,
}

impl DecodedPage {
    /// Number of records on this page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the page carried no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Trait for decoding response bodies into records
pub trait RecordDecoder: Send + Sync {
    /// Decode the response body into a list of records
    fn decode(&self, body: &str) -> Result<Vec<Record>>;

    /// Decode the response body into records plus page metadata
    fn decode_page(&self, body: &str) -> Result<DecodedPage>;
}

/// One way of locating the item collection inside a JSON document.
///
/// Extractors are tried in order; the first one that returns a value
/// decides where the items are.
pub trait ItemExtractor: Send + Sync + std::fmt::Debug {
    /// Short name used in debug logs
    fn name(&self) -> &str;

    /// Return the item collection if this extractor recognizes the document
    fn try_extract<'a>(&self, document: &'a Value) -> Option<&'a Value>;
}
