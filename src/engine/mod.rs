//! Execution engine module
//!
//! Runs a collection: every selected endpoint in order, one after another.
//!
//! # Overview
//!
//! For each endpoint the [`Collector`]:
//! 1. paginates it through a [`PageFetcher`]
//! 2. profiles the dataset
//! 3. writes data, sample and summary CSV files
//! 4. loads the records into the warehouse, if one is configured
//!
//! A failing endpoint is recorded in the [`RunReport`] and the run moves on.

mod types;

pub use types::{EndpointOutcome, EndpointReport, RunReport};

use crate::config::{Endpoint, WarehouseConfig};
use crate::error::Result;
use crate::output::CsvSink;
use crate::pagination::{PageFetcher, PaginationConfig, PaginationOutcome, Paginator};
use crate::schema::{SchemaProfile, Summarizer};
use crate::types::Record;
use crate::warehouse::{LoadResult, Warehouse};
use chrono::Utc;
use tracing::{info, warn};

/// Multi-endpoint collector
pub struct Collector<F> {
    /// Page source
    fetcher: F,
    /// Pagination loop
    paginator: Paginator,
    /// Dataset profiler
    summarizer: Summarizer,
    /// CSV outputs
    sink: CsvSink,
    /// Optional relational sink and its mappings
    warehouse: Option<(Warehouse, WarehouseConfig)>,
}

impl<F: PageFetcher> Collector<F> {
    /// Create a collector writing CSV files only
    pub fn new(fetcher: F, pagination: PaginationConfig, sink: CsvSink) -> Self {
        Self {
            fetcher,
            paginator: Paginator::new(pagination),
            summarizer: Summarizer::new(),
            sink,
            warehouse: None,
        }
    }

    /// Also load every collected dataset into `warehouse`
    #[must_use]
    pub fn with_warehouse(mut self, warehouse: Warehouse, config: WarehouseConfig) -> Self {
        self.warehouse = Some((warehouse, config));
        self
    }

    /// CSV sink
    pub fn sink(&self) -> &CsvSink {
        &self.sink
    }

    /// Collect `endpoints` in order.
    ///
    /// Endpoint failures are part of the report; only a failure to write the
    /// combined summary is returned as an error.
    pub async fn run(&mut self, endpoints: &[&Endpoint]) -> Result<RunReport> {
        let mut report = RunReport::new(self.sink.dir());
        let mut profiles: Vec<(String, SchemaProfile)> = Vec::new();

        for endpoint in endpoints {
            info!(endpoint = %endpoint.name, url = %endpoint.url, "collecting endpoint");

            let outcome = match self.paginator.paginate(&self.fetcher, endpoint).await {
                Ok(outcome) if outcome.is_empty() => {
                    info!(endpoint = %endpoint.name, "no records returned");
                    EndpointOutcome::Empty {
                        pages: outcome.pages_fetched,
                    }
                }
                Ok(outcome) => self.process(endpoint, outcome, &mut profiles),
                Err(e) => {
                    warn!(endpoint = %endpoint.name, error = %e, "collection failed");
                    EndpointOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };

            report.endpoints.push(EndpointReport {
                name: endpoint.name.clone(),
                outcome,
            });
        }

        if !profiles.is_empty() {
            let path = self
                .sink
                .write_combined_summary(profiles.iter().map(|(name, p)| (name.as_str(), p)))?;
            info!(path = %path.display(), endpoints = profiles.len(), "wrote combined summary");
            report.combined_summary = Some(path);
        }

        report.finished_at = Utc::now();
        info!(
            collected = report.collected(),
            empty = report.empty(),
            failed = report.failed(),
            rows = report.total_rows(),
            "run finished"
        );
        Ok(report)
    }

    /// Profile, write and load one non-empty dataset
    fn process(
        &mut self,
        endpoint: &Endpoint,
        outcome: PaginationOutcome,
        profiles: &mut Vec<(String, SchemaProfile)>,
    ) -> EndpointOutcome {
        let profile = self.summarizer.summarize(&outcome.dataset);

        if let Err(e) = self
            .sink
            .write_endpoint(&endpoint.name, &outcome.dataset, &profile)
        {
            warn!(endpoint = %endpoint.name, error = %e, "failed to write outputs");
            return EndpointOutcome::Failed {
                error: e.to_string(),
            };
        }

        let columns = profile.len();
        profiles.push((endpoint.name.clone(), profile));

        let loads = match self.load(&endpoint.name, &outcome.dataset) {
            Ok(loads) => loads,
            Err(e) => {
                warn!(endpoint = %endpoint.name, error = %e, "warehouse load failed");
                return EndpointOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        info!(
            endpoint = %endpoint.name,
            rows = outcome.len(),
            pages = outcome.pages_fetched,
            stop_reason = %outcome.stop_reason,
            columns,
            "endpoint collected"
        );

        EndpointOutcome::Collected {
            rows: outcome.len(),
            pages: outcome.pages_fetched,
            stop_reason: outcome.stop_reason,
            total_count: outcome.total_count,
            columns,
            loads,
        }
    }

    /// Raw load and every mapping fed by this endpoint, in one transaction
    fn load(&mut self, api_name: &str, records: &[Record]) -> Result<Vec<LoadResult>> {
        let Some((warehouse, config)) = self.warehouse.as_mut() else {
            return Ok(Vec::new());
        };

        warehouse.load_endpoint(api_name, records, config)
    }
}
