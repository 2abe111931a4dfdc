//! Page-number paginator
//!
//! Walks `pageNo = 1..=max_pages`, normalizing each page and stopping at the
//! first natural end: an empty page, the declared total reached, or a short
//! page. The page cap bounds the loop against endpoints that always return
//! full pages.

use super::types::{PageFetcher, PaginationConfig, PaginationOutcome, StopReason};
use crate::config::Endpoint;
use crate::decode::decode_page_at;
use crate::error::Result;
use tracing::debug;

/// Sequential paginator for stateless page-number APIs
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    config: PaginationConfig,
}

impl Paginator {
    /// Create a paginator
    pub fn new(config: PaginationConfig) -> Self {
        Self { config }
    }

    /// Pagination settings
    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Collect every record of `endpoint`.
    ///
    /// Transport and parse errors abort the run; records gathered before the
    /// failure are discarded with it.
    pub async fn paginate<F>(&self, fetcher: &F, endpoint: &Endpoint) -> Result<PaginationOutcome>
    where
        F: PageFetcher + ?Sized,
    {
        let page_size = self.config.page_size as usize;
        let mut dataset = Vec::new();
        let mut total_count = None;
        let mut pages_fetched = 0;
        let mut stop_reason = StopReason::MaxPages;

        for page in 1..=self.config.max_pages {
            if page > 1 && !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }

            let request = self.config.request_for(endpoint, page);
            let raw = fetcher.fetch_page(&request).await?;
            pages_fetched = page;

            let decoded = decode_page_at(
                &raw.body,
                raw.content_type.as_deref(),
                endpoint.items_path.as_deref(),
            )?;
            let returned = decoded.len();
            if decoded.total_count.is_some() {
                total_count = decoded.total_count;
            }

            debug!(
                endpoint = %endpoint.name,
                page,
                records = returned,
                total_count = ?decoded.total_count,
                "fetched page"
            );

            if returned == 0 {
                stop_reason = StopReason::EmptyPage;
                break;
            }

            dataset.extend(decoded.records);

            if decoded
                .total_count
                .is_some_and(|total| dataset.len() as u64 >= total)
            {
                stop_reason = StopReason::TotalCountReached;
                break;
            }

            if returned < page_size {
                stop_reason = StopReason::ShortPage;
                break;
            }
        }

        Ok(PaginationOutcome {
            dataset,
            pages_fetched,
            stop_reason,
            total_count,
        })
    }
}

/// Paginate with the given settings (convenience function)
pub async fn paginate<F>(
    fetcher: &F,
    endpoint: &Endpoint,
    config: PaginationConfig,
) -> Result<PaginationOutcome>
where
    F: PageFetcher + ?Sized,
{
    Paginator::new(config).paginate(fetcher, endpoint).await
}
