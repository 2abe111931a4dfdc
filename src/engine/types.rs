//! Engine types
//!
//! Per-endpoint outcomes and the aggregated run report.

use crate::pagination::StopReason;
use crate::warehouse::LoadResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// What happened to one endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EndpointOutcome {
    /// Records were collected, profiled and written
    Collected {
        /// Records collected
        rows: usize,
        /// Requests issued
        pages: u32,
        /// Why pagination ended
        stop_reason: StopReason,
        /// Declared total, if the API reported one
        total_count: Option<u64>,
        /// Distinct fields observed
        columns: usize,
        /// Warehouse loads, empty without a warehouse
        loads: Vec<LoadResult>,
    },
    /// The first page had no records
    Empty {
        /// Requests issued
        pages: u32,
    },
    /// Fetching, parsing, writing or loading failed
    Failed {
        /// Error message
        error: String,
    },
}

impl EndpointOutcome {
    /// Whether the endpoint failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Records collected (0 unless collected)
    pub fn rows(&self) -> usize {
        match self {
            Self::Collected { rows, .. } => *rows,
            _ => 0,
        }
    }
}

/// Result of one endpoint within a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointReport {
    /// Endpoint name
    pub name: String,
    /// Outcome
    #[serde(flatten)]
    pub outcome: EndpointOutcome,
}

/// Result of a whole collection run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Run start
    pub started_at: DateTime<Utc>,
    /// Run end
    pub finished_at: DateTime<Utc>,
    /// Directory holding the CSV outputs
    pub output_dir: PathBuf,
    /// One report per endpoint, in run order
    pub endpoints: Vec<EndpointReport>,
    /// Combined summary file, written when at least one endpoint was profiled
    pub combined_summary: Option<PathBuf>,
}

impl RunReport {
    /// Create an empty report starting now
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            output_dir: output_dir.into(),
            endpoints: Vec::new(),
            combined_summary: None,
        }
    }

    /// Endpoints with collected records
    pub fn collected(&self) -> usize {
        self.endpoints
            .iter()
            .filter(|e| matches!(e.outcome, EndpointOutcome::Collected { .. }))
            .count()
    }

    /// Endpoints that returned no records
    pub fn empty(&self) -> usize {
        self.endpoints
            .iter()
            .filter(|e| matches!(e.outcome, EndpointOutcome::Empty { .. }))
            .count()
    }

    /// Endpoints that failed
    pub fn failed(&self) -> usize {
        self.endpoints.iter().filter(|e| e.outcome.is_failed()).count()
    }

    /// Whether every endpoint failed (false for a run without endpoints)
    pub fn all_failed(&self) -> bool {
        !self.endpoints.is_empty() && self.failed() == self.endpoints.len()
    }

    /// Records collected across all endpoints
    pub fn total_rows(&self) -> usize {
        self.endpoints.iter().map(|e| e.outcome.rows()).sum()
    }

    /// Wall-clock duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        (self.finished_at - self.started_at).num_milliseconds().max(0) as u64
    }
}
