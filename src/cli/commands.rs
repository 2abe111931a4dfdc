//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Agricultural-market API collector and schema profiler
#[derive(Parser, Debug)]
#[command(name = "agri-explorer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Collection definition: built-in name or YAML file
    #[arg(short, long, global = true, default_value = "agri-market")]
    pub config: String,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect endpoints, write CSV outputs and load the warehouse
    Collect {
        /// Endpoints to collect (comma-separated, empty = all)
        #[arg(long)]
        endpoints: Option<String>,

        /// Output directory (overrides the collection's output.dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the warehouse even if one is configured
        #[arg(long)]
        no_warehouse: bool,
    },

    /// Profile saved response bodies (JSON or XML)
    Profile {
        /// Response files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Content type to assume instead of sniffing the body
        #[arg(long)]
        content_type: Option<String>,
    },

    /// List the collection's endpoints
    Endpoints,

    /// Validate the collection definition
    Validate,

    /// List warehouse tables by kind (dimension, fact, raw)
    Tables,

    /// List built-in collections
    List,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
