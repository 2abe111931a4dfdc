//! CLI module
//!
//! Command-line interface for running collections.
//!
//! # Commands
//!
//! - `collect` - Fetch endpoints, write CSV outputs, load the warehouse
//! - `profile` - Profile saved response bodies offline
//! - `endpoints` - List configured endpoints
//! - `validate` - Validate a collection definition
//! - `tables` - Inventory of warehouse tables
//! - `list` - List built-in collections

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
