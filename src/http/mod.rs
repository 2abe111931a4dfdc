//! HTTP client module
//!
//! Provides the HTTP client behind the paginator.
//!
//! # Features
//!
//! - **Default Query**: service key and response format on every request
//! - **Status Classification**: non-2xx responses become transport errors
//! - **Content Type**: captured for JSON/XML detection

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};

#[cfg(test)]
mod tests;
