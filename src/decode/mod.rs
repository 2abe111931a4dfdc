//! Response normalizer module
//!
//! Supports: JSON, XML
//!
//! # Overview
//!
//! Turns one raw response body into a list of flat records, absorbing the
//! different ways public APIs wrap their items. JSON documents go through an
//! ordered chain of [`ItemExtractor`] strategies; XML documents yield one
//! record per `<item>` element at any depth.

mod decoders;
mod extractors;
mod types;

pub use decoders::{decode_page, decode_page_at, normalize, JsonDecoder, XmlDecoder};
pub use extractors::{
    coerce_items, default_extractors, extract_total_count, flatten_record, EnvelopeItems,
    PathItems, TopLevelItems, WholeDocument,
};
pub use types::{DecodedPage, ItemExtractor, PayloadFormat, RecordDecoder};
