//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::CollectionConfig;
use crate::decode::normalize;
use crate::engine::{Collector, RunReport};
use crate::error::{Error, Result, ResultExt};
use crate::http::HttpClient;
use crate::loader::load_collection;
use crate::output::{CsvSink, CsvWriterConfig};
use crate::schema::summarize;
use crate::warehouse::Warehouse;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Collect {
                endpoints,
                output,
                no_warehouse,
            } => {
                self.collect(endpoints.as_deref(), output.as_deref(), *no_warehouse)
                    .await
            }
            Commands::Profile {
                files,
                content_type,
            } => self.profile(files, content_type.as_deref()),
            Commands::Endpoints => self.endpoints(),
            Commands::Validate => self.validate(),
            Commands::Tables => self.tables(),
            Commands::List => self.list_collections(),
        }
    }

    /// Load the collection definition
    fn load_collection(&self) -> Result<CollectionConfig> {
        load_collection(&self.cli.config)
    }

    /// Collect endpoints and print the run report.
    ///
    /// Fails only when every selected endpoint failed.
    async fn collect(
        &self,
        endpoints: Option<&str>,
        output: Option<&Path>,
        no_warehouse: bool,
    ) -> Result<()> {
        let config = self.load_collection()?;
        let names = parse_list(endpoints);
        let selected = config.select_endpoints(&names)?;

        let service_key = config.resolve_service_key();
        if service_key.is_none() {
            warn!(
                env = %config.service_key_env,
                "no service key configured, requests are sent without credentials"
            );
        }

        let client = HttpClient::with_config(config.http_client_config(service_key.as_deref()))?;

        let dir: PathBuf = output.map_or_else(|| config.output.dir.clone(), Path::to_path_buf);
        let sink = CsvSink::new(
            dir,
            CsvWriterConfig::new()
                .with_bom(config.output.bom)
                .with_sample_rows(config.output.sample_rows),
        );

        let mut collector = Collector::new(client, config.pagination_config(), sink);
        match (&config.warehouse, no_warehouse) {
            (Some(warehouse_config), false) => {
                let warehouse = Warehouse::open(warehouse_config)?;
                warehouse.check_connection()?;
                info!(engine = %warehouse_config.engine, "warehouse connected");
                collector = collector.with_warehouse(warehouse, warehouse_config.clone());
            }
            (Some(_), true) => info!("warehouse disabled by --no-warehouse"),
            (None, _) => {}
        }

        info!(
            collection = %config.name,
            endpoints = selected.len(),
            "starting collection"
        );
        let report = collector.run(&selected).await?;
        self.output_report(&report);

        if report.all_failed() {
            return Err(Error::Other(format!(
                "All {} endpoints failed",
                report.endpoints.len()
            )));
        }
        Ok(())
    }

    /// Profile saved response bodies
    fn profile(&self, files: &[PathBuf], content_type: Option<&str>) -> Result<()> {
        for file in files {
            let body = fs::read_to_string(file)
                .with_context(|| format!("Failed to read '{}'", file.display()))?;
            let records = normalize(&body, content_type)?;
            let profile = summarize(&records);

            self.output_message(&json!({
                "type": "PROFILE",
                "file": file.display().to_string(),
                "records": records.len(),
                "profile": profile
            }));
        }
        Ok(())
    }

    /// List configured endpoints
    fn endpoints(&self) -> Result<()> {
        let config = self.load_collection()?;

        let endpoints: Vec<Value> = config
            .endpoints
            .iter()
            .map(|e| {
                json!({
                    "name": e.name,
                    "url": e.url,
                    "params": e.params
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "ENDPOINTS",
            "collection": config.name,
            "endpoints": endpoints
        }));

        Ok(())
    }

    /// Validate the collection definition
    fn validate(&self) -> Result<()> {
        let config = self.load_collection()?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Collection '{}' is valid with {} endpoints{}",
                    config.name,
                    config.endpoints.len(),
                    if config.warehouse.is_some() { " and a warehouse" } else { "" }
                )
            }
        }));

        Ok(())
    }

    /// Print the warehouse table inventory
    fn tables(&self) -> Result<()> {
        let config = self.load_collection()?;
        let warehouse_config = config.warehouse.as_ref().ok_or_else(|| {
            Error::config(format!("Collection '{}' has no warehouse", config.name))
        })?;

        let warehouse = Warehouse::open(warehouse_config)?;
        let inventory = warehouse.table_inventory()?;

        self.output_message(&json!({
            "type": "TABLES",
            "engine": warehouse_config.engine.to_string(),
            "count": inventory.len(),
            "tables": inventory
        }));

        Ok(())
    }

    /// List built-in collections
    fn list_collections(&self) -> Result<()> {
        use crate::connectors::list_builtin_info;

        let collections: Vec<Value> = list_builtin_info()
            .into_iter()
            .map(|info| {
                json!({
                    "name": info.name,
                    "description": info.description,
                    "aliases": info.aliases,
                    "warehouse": info.warehouse
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "COLLECTIONS",
            "collections": collections
        }));

        Ok(())
    }

    /// Output the run report
    fn output_report(&self, report: &RunReport) {
        self.output_message(&json!({
            "type": "REPORT",
            "collected": report.collected(),
            "empty": report.empty(),
            "failed": report.failed(),
            "rows": report.total_rows(),
            "duration_ms": report.duration_ms(),
            "report": report
        }));
    }

    /// Output a message in the configured format
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Split a comma-separated list, dropping blanks
pub(crate) fn parse_list(list: Option<&str>) -> Vec<String> {
    list.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}
