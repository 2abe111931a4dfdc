//! Pagination types and traits
//!
//! Defines the page request/response abstractions shared by the paginator
//! and its fetchers.

use crate::config::Endpoint;
use crate::error::Result;
use crate::types::Dataset;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One page request: the endpoint URL and the full query for that page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Endpoint URL without query string
    pub url: String,
    /// Base parameters merged with the page parameters
    pub query: Vec<(String, String)>,
    /// 1-based page number
    pub page: u32,
}

impl PageRequest {
    /// Look up a query parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response body of one page
#[derive(Debug, Clone, Default)]
pub struct RawPage {
    /// Response body text
    pub body: String,
    /// `Content-Type` header, if the server sent one
    pub content_type: Option<String>,
}

impl RawPage {
    /// Create a page from a body and an optional content type
    pub fn new(body: impl Into<String>, content_type: Option<&str>) -> Self {
        Self {
            body: body.into(),
            content_type: content_type.map(str::to_string),
        }
    }
}

/// Source of raw pages (HTTP in production, canned bodies in tests)
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one page. Transport failures are returned as errors.
    async fn fetch_page(&self, request: &PageRequest) -> Result<RawPage>;
}

/// Configuration for page-number pagination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Query parameter carrying the page number
    pub page_param: String,
    /// Query parameter carrying the page size
    pub size_param: String,
    /// Rows requested per page
    pub page_size: u32,
    /// Hard cap on requests per endpoint
    pub max_pages: u32,
    /// Courtesy pause between consecutive requests
    pub delay: Duration,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_param: "pageNo".to_string(),
            size_param: "numOfRows".to_string(),
            page_size: 100,
            max_pages: 50,
            delay: Duration::from_millis(200),
        }
    }
}

impl PaginationConfig {
    /// Create a config with the given page size and cap
    pub fn new(page_size: u32, max_pages: u32) -> Self {
        Self {
            page_size,
            max_pages,
            ..Self::default()
        }
    }

    /// Set the courtesy delay
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the page/size parameter names
    #[must_use]
    pub fn with_params(mut self, page_param: impl Into<String>, size_param: impl Into<String>) -> Self {
        self.page_param = page_param.into();
        self.size_param = size_param.into();
        self
    }

    /// Build the request for `page` of `endpoint`
    pub fn request_for(&self, endpoint: &Endpoint, page: u32) -> PageRequest {
        let mut query: Vec<(String, String)> = endpoint
            .params
            .iter()
            .filter(|(k, _)| **k != self.page_param && **k != self.size_param)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        query.push((self.page_param.clone(), page.to_string()));
        query.push((self.size_param.clone(), self.page_size.to_string()));

        PageRequest {
            url: endpoint.url.clone(),
            query,
            page,
        }
    }
}

/// Why pagination ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// A page normalized to zero records
    EmptyPage,
    /// Accumulated records reached the declared total
    TotalCountReached,
    /// A page returned fewer records than requested
    ShortPage,
    /// The page cap was exhausted
    MaxPages,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StopReason::EmptyPage => "empty_page",
            StopReason::TotalCountReached => "total_count_reached",
            StopReason::ShortPage => "short_page",
            StopReason::MaxPages => "max_pages",
        };
        f.write_str(s)
    }
}

/// Result of paginating one endpoint
#[derive(Debug, Clone)]
pub struct PaginationOutcome {
    /// All records in page order
    pub dataset: Dataset,
    /// Requests issued
    pub pages_fetched: u32,
    /// Why the loop ended
    pub stop_reason: StopReason,
    /// Last declared total, if any page carried one
    pub total_count: Option<u64>,
}

impl PaginationOutcome {
    /// Number of collected records
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// Whether nothing was collected
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }
}
