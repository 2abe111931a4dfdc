//! Configuration types for collection definitions
//!
//! This module contains the structures a collection YAML file deserializes
//! into: the endpoints to walk, HTTP and pagination settings, the CSV sink
//! and the optional warehouse.

use crate::error::{Error, Result};
use crate::http::HttpClientConfig;
use crate::pagination::PaginationConfig;
use crate::types::ReturnType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Top-Level Collection Config
// ============================================================================

/// Complete collection configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Collection name (e.g., "agri-market")
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,

    /// Environment variable holding the service key
    #[serde(default = "default_service_key_env")]
    pub service_key_env: String,

    /// Literal service key, takes precedence over the environment
    #[serde(default, skip_serializing)]
    pub service_key: Option<String>,

    /// Response format requested from the API
    #[serde(default)]
    pub return_type: ReturnType,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Pagination settings shared by all endpoints
    #[serde(default)]
    pub pagination: PaginationSettings,

    /// CSV sink settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Optional relational sink
    #[serde(default)]
    pub warehouse: Option<WarehouseConfig>,

    /// Endpoints to collect, in order
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

fn default_service_key_env() -> String {
    "DATA_GO_KR_KEY".to_string()
}

impl CollectionConfig {
    /// Find an endpoint by name
    pub fn endpoint(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.name == name)
    }

    /// Endpoints to run: all of them, or the named subset in config order
    pub fn select_endpoints(&self, names: &[String]) -> Result<Vec<&Endpoint>> {
        if names.is_empty() {
            return Ok(self.endpoints.iter().collect());
        }
        if let Some(unknown) = names.iter().find(|n| self.endpoint(n).is_none()) {
            return Err(Error::invalid_value(
                "endpoints",
                format!("unknown endpoint '{unknown}'"),
            ));
        }
        Ok(self
            .endpoints
            .iter()
            .filter(|e| names.contains(&e.name))
            .collect())
    }

    /// Service key from config or environment, if any
    pub fn resolve_service_key(&self) -> Option<String> {
        self.service_key
            .clone()
            .or_else(|| std::env::var(&self.service_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }

    /// Paginator settings
    pub fn pagination_config(&self) -> PaginationConfig {
        PaginationConfig::new(self.pagination.page_size, self.pagination.max_pages)
            .with_delay(Duration::from_millis(self.pagination.delay_ms))
            .with_params(&self.pagination.page_param, &self.pagination.size_param)
    }

    /// HTTP client settings, with the service key and response format as
    /// default query parameters
    pub fn http_client_config(&self, service_key: Option<&str>) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.http.timeout_secs))
            .query(&self.http.return_type_param, self.return_type.as_param());

        if let Some(key) = service_key {
            builder = builder.query(&self.http.service_key_param, key);
        }
        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(agent);
        }
        for (key, value) in &self.http.headers {
            builder = builder.header(key, value);
        }
        builder.build()
    }
}

// ============================================================================
// Endpoint
// ============================================================================

/// One paginated API endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Unique name, used for output files and raw tables
    pub name: String,

    /// URL without query string
    pub url: String,

    /// Base filter parameters sent with every page
    #[serde(default)]
    pub params: BTreeMap<String, String>,

    /// Dot-notation path of the JSON item collection (e.g. `data.rows`),
    /// tried before the standard envelope lookups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_path: Option<String>,
}

impl Endpoint {
    /// Create an endpoint without parameters
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            params: BTreeMap::new(),
            items_path: None,
        }
    }

    /// Look up JSON items at a dot-notation path first
    #[must_use]
    pub fn with_items_path(mut self, path: impl Into<String>) -> Self {
        self.items_path = Some(path.into());
        self
    }

    /// Add a base parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Extra headers on every request
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Query parameter carrying the service key
    #[serde(default = "default_service_key_param")]
    pub service_key_param: String,

    /// Query parameter carrying the response format
    #[serde(default = "default_return_type_param")]
    pub return_type_param: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: None,
            headers: HashMap::new(),
            service_key_param: default_service_key_param(),
            return_type_param: default_return_type_param(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_service_key_param() -> String {
    "serviceKey".to_string()
}

fn default_return_type_param() -> String {
    "returnType".to_string()
}

// ============================================================================
// Pagination Settings
// ============================================================================

/// Page-number pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationSettings {
    /// Rows per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Maximum requests per endpoint
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Pause between pages in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Page number parameter
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Page size parameter
    #[serde(default = "default_size_param")]
    pub size_param: String,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            delay_ms: default_delay_ms(),
            page_param: default_page_param(),
            size_param: default_size_param(),
        }
    }
}

fn default_page_size() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    50
}

fn default_delay_ms() -> u64 {
    200
}

fn default_page_param() -> String {
    "pageNo".to_string()
}

fn default_size_param() -> String {
    "numOfRows".to_string()
}

// ============================================================================
// Output Config
// ============================================================================

/// CSV sink settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Rows in `<name>_sample.csv`
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,

    /// Write a UTF-8 byte order mark
    #[serde(default = "default_true")]
    pub bom: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            sample_rows: default_sample_rows(),
            bom: true,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_sample_rows() -> usize {
    10
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Warehouse Config
// ============================================================================

/// Warehouse backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarehouseEngine {
    /// Local DuckDB file or `:memory:`
    #[default]
    DuckDb,
    /// MySQL attached through the DuckDB extension
    MySql,
    /// PostgreSQL attached through the DuckDB extension
    Postgres,
}

impl std::fmt::Display for WarehouseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarehouseEngine::DuckDb => write!(f, "duckdb"),
            WarehouseEngine::MySql => write!(f, "mysql"),
            WarehouseEngine::Postgres => write!(f, "postgres"),
        }
    }
}

/// Relational sink settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Backend
    #[serde(default)]
    pub engine: WarehouseEngine,

    /// DuckDB path or MySQL/PostgreSQL connection string
    pub database: String,

    /// Prefix of raw tables (`raw_<endpoint>`)
    #[serde(default = "default_raw_prefix")]
    pub raw_table_prefix: String,

    /// Load raw tables
    #[serde(default = "default_true")]
    pub load_raw: bool,

    /// Projections into dimension and fact tables
    #[serde(default)]
    pub mappings: Vec<TableMapping>,
}

fn default_raw_prefix() -> String {
    "raw_".to_string()
}

impl WarehouseConfig {
    /// Mappings fed by `endpoint`
    pub fn mappings_for<'a>(&'a self, endpoint: &'a str) -> impl Iterator<Item = &'a TableMapping> {
        self.mappings.iter().filter(move |m| m.applies_to(endpoint))
    }
}

/// Projection of endpoint records into one target table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMapping {
    /// Target table
    pub table: String,

    /// Endpoints feeding this table; empty means all
    #[serde(default)]
    pub endpoints: Vec<String>,

    /// Source field to target column pairs
    pub columns: Vec<ColumnMapping>,

    /// Skip rows violating a unique key instead of failing
    #[serde(default)]
    pub ignore_duplicates: bool,

    /// Skip records where any mapped source field is missing or null
    #[serde(default)]
    pub require_all: bool,
}

impl TableMapping {
    /// Whether this mapping consumes records of `endpoint`
    pub fn applies_to(&self, endpoint: &str) -> bool {
        self.endpoints.is_empty() || self.endpoints.iter().any(|e| e == endpoint)
    }
}

/// One source field to target column projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Record field
    pub source: String,
    /// Table column
    pub target: String,
}
