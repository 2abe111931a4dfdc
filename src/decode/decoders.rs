//! Decoder implementations
//!
//! Each decoder handles a specific response format.

use super::extractors::{coerce_items, default_extractors, extract_total_count, PathItems};
use super::types::{DecodedPage, ItemExtractor, PayloadFormat, RecordDecoder};
use crate::error::{Error, Result};
use crate::types::Record;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::Value;
use tracing::trace;

// ============================================================================
// JSON Decoder
// ============================================================================

/// JSON decoder driven by an ordered chain of item extractors
#[derive(Debug)]
pub struct JsonDecoder {
    extractors: Vec<Box<dyn ItemExtractor>>,
}

impl Default for JsonDecoder {
    fn default() -> Self {
        Self {
            extractors: default_extractors(),
        }
    }
}

impl JsonDecoder {
    /// Create a JSON decoder with the default extractor chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Put an extra extractor in front of the chain
    #[must_use]
    pub fn prepend(mut self, extractor: Box<dyn ItemExtractor>) -> Self {
        self.extractors.insert(0, extractor);
        self
    }

    /// Extract records from an already parsed document
    pub fn extract_records(&self, document: &Value, body: &str) -> Result<Vec<Record>> {
        check_envelope(document, body)?;

        for extractor in &self.extractors {
            if let Some(items) = extractor.try_extract(document) {
                trace!(extractor = extractor.name(), "located item collection");
                return Ok(coerce_items(items));
            }
        }

        Err(Error::parse(
            "JSON",
            "no extractor recognized the document",
            body,
        ))
    }

    fn parse(body: &str) -> Result<Value> {
        serde_json::from_str(body.trim_start_matches('\u{feff}'))
            .map_err(|e| Error::parse("JSON", e.to_string(), body))
    }
}

impl RecordDecoder for JsonDecoder {
    fn decode(&self, body: &str) -> Result<Vec<Record>> {
        let document = Self::parse(body)?;
        self.extract_records(&document, body)
    }

    fn decode_page(&self, body: &str) -> Result<DecodedPage> {
        let document = Self::parse(body)?;
        Ok(DecodedPage {
            format: PayloadFormat::Json,
            records: self.extract_records(&document, body)?,
            total_count: extract_total_count(&document),
        })
    }
}

/// A `response` envelope without a body is an API error report, not data
fn check_envelope(document: &Value, body: &str) -> Result<()> {
    let Some(response) = document.get("response") else {
        return Ok(());
    };
    if response.get("body").is_some_and(Value::is_object) {
        return Ok(());
    }

    let header = response.get("header");
    let code = header
        .and_then(|h| h.get("resultCode"))
        .map(|c| c.as_str().map_or_else(|| c.to_string(), str::to_string));
    let message = header
        .and_then(|h| h.get("resultMsg"))
        .and_then(Value::as_str)
        .unwrap_or("response envelope has no body");

    Err(Error::parse(
        "JSON",
        match code {
            Some(code) => format!("{message} (resultCode {code})"),
            None => message.to_string(),
        },
        body,
    ))
}

// ============================================================================
// XML Decoder
// ============================================================================

/// XML decoder collecting every `<item>` element below the root.
///
/// Each item becomes one record built from its direct child elements:
/// the child tag is the field name and the child's text the value
/// (null when the child has no text). Text is kept verbatim, surrounding
/// whitespace included. Items without children are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlDecoder;

/// Element holding one record
const ITEM_ELEMENT: &str = "item";

/// One open element while walking the document
struct Frame {
    /// Slot of the record this element opens, if it is an item
    item_slot: Option<usize>,
    /// Slot and field name if this element is a direct child of an item
    field: Option<(usize, String)>,
    /// Text seen before the first child element
    text: String,
    /// Whether a child element has started
    child_seen: bool,
}

impl XmlDecoder {
    /// Create a new XML decoder for `<item>` elements
    pub fn new() -> Self {
        Self
    }

    fn open(name: &str, stack: &mut [Frame], slots: &mut Vec<Record>) -> Frame {
        let parent = stack.last_mut();
        let field = parent.and_then(|p| {
            p.child_seen = true;
            p.item_slot.map(|slot| (slot, name.to_string()))
        });

        // The root element itself is never an item
        let item_slot = (!stack.is_empty() && name == ITEM_ELEMENT).then(|| {
            slots.push(Record::new());
            slots.len() - 1
        });

        Frame {
            item_slot,
            field,
            text: String::new(),
            child_seen: false,
        }
    }

    fn close(frame: Frame, slots: &mut [Record]) {
        if let Some((slot, key)) = frame.field {
            let value = if frame.text.is_empty() {
                Value::Null
            } else {
                Value::String(frame.text)
            };
            slots[slot].insert(key, value);
        }
    }
}

impl RecordDecoder for XmlDecoder {
    fn decode(&self, body: &str) -> Result<Vec<Record>> {
        let xml_error = |e: &dyn std::fmt::Display| Error::parse("XML", e.to_string(), body);

        let mut reader = Reader::from_str(body.trim_start_matches('\u{feff}'));

        let mut stack: Vec<Frame> = Vec::new();
        let mut slots: Vec<Record> = Vec::new();
        let mut root_seen = false;

        loop {
            match reader.read_event().map_err(|e| xml_error(&e))? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if stack.is_empty() {
                        if root_seen {
                            return Err(xml_error(&"multiple root elements"));
                        }
                        root_seen = true;
                    }
                    let frame = Self::open(&name, &mut stack, &mut slots);
                    stack.push(frame);
                }
                Event::Empty(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if stack.is_empty() {
                        if root_seen {
                            return Err(xml_error(&"multiple root elements"));
                        }
                        root_seen = true;
                    }
                    let frame = Self::open(&name, &mut stack, &mut slots);
                    Self::close(frame, &mut slots);
                }
                Event::End(_) => {
                    let frame = stack
                        .pop()
                        .ok_or_else(|| xml_error(&"unexpected closing tag"))?;
                    Self::close(frame, &mut slots);
                }
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| xml_error(&e))?;
                    push_text(&mut stack, &text);
                }
                Event::CData(c) => {
                    let raw = c.into_inner();
                    push_text(&mut stack, &String::from_utf8_lossy(&raw));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !root_seen {
            return Err(xml_error(&"document has no root element"));
        }
        if !stack.is_empty() {
            return Err(xml_error(&"unexpected end of document"));
        }

        Ok(slots.into_iter().filter(|r| !r.is_empty()).collect())
    }

    fn decode_page(&self, body: &str) -> Result<DecodedPage> {
        Ok(DecodedPage {
            format: PayloadFormat::Xml,
            records: self.decode(body)?,
            total_count: None,
        })
    }
}

fn push_text(stack: &mut [Frame], text: &str) {
    if let Some(frame) = stack.last_mut() {
        if !frame.child_seen {
            frame.text.push_str(text);
        }
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Normalize a response body into flat records.
///
/// The format is chosen by [`PayloadFormat::detect`].
pub fn normalize(body: &str, content_type: Option<&str>) -> Result<Vec<Record>> {
    decode_page(body, content_type).map(|page| page.records)
}

/// Normalize a response body and keep the page metadata
pub fn decode_page(body: &str, content_type: Option<&str>) -> Result<DecodedPage> {
    decode_page_at(body, content_type, None)
}

/// Like [`decode_page`], but JSON items are looked up at `items_path` first.
///
/// The default extractor chain still applies when the path does not resolve.
/// XML bodies ignore the path.
pub fn decode_page_at(
    body: &str,
    content_type: Option<&str>,
    items_path: Option<&str>,
) -> Result<DecodedPage> {
    match PayloadFormat::detect(body, content_type) {
        PayloadFormat::Json => {
            let decoder = match items_path {
                Some(path) => JsonDecoder::new().prepend(Box::new(PathItems::new(path))),
                None => JsonDecoder::new(),
            };
            decoder.decode_page(body)
        }
        PayloadFormat::Xml => XmlDecoder::new().decode_page(body),
    }
}
