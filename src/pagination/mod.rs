//! Pagination module
//!
//! Supports: Page Number (`pageNo` / `numOfRows`)
//!
//! # Overview
//!
//! Drives repeated fetches against a stateless page-based API until it is
//! exhausted. Termination uses the record count of each normalized page and
//! the `totalCount` declared by the response envelope, with `max_pages` as a
//! hard cap.

mod paginator;
mod types;

pub use paginator::{paginate, Paginator};
pub use types::{
    PageFetcher, PageRequest, PaginationConfig, PaginationOutcome, RawPage, StopReason,
};
