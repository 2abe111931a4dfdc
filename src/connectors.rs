//! Built-in collection definitions embedded in the binary
//!
//! This module embeds the shipped collection YAML files directly into the
//! binary, allowing users to use `--config agri-market` instead of a path.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Built-in collection YAML definitions
pub static BUILTIN_COLLECTIONS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();

        // Market price exploration (all endpoints, CSV only)
        m.insert("agri-market", include_str!("../connectors/agri-market.yaml"));
        m.insert("kamis", include_str!("../connectors/agri-market.yaml"));

        // Warehouse ETL
        m.insert(
            "agri-market-etl",
            include_str!("../connectors/agri-market-etl.yaml"),
        );

        m
    });

/// Get a built-in collection by name
pub fn get_builtin(name: &str) -> Option<&'static str> {
    BUILTIN_COLLECTIONS.get(name).copied()
}

/// Check if a name is a built-in collection
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_COLLECTIONS.contains_key(name)
}

/// List all built-in collection names (primary names only)
pub fn list_builtin() -> Vec<&'static str> {
    vec!["agri-market", "agri-market-etl"]
}

/// Collection metadata for display
#[derive(Debug, Clone)]
pub struct CollectionInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub aliases: &'static [&'static str],
    pub warehouse: bool,
}

/// Get detailed info about all built-in collections
pub fn list_builtin_info() -> Vec<CollectionInfo> {
    vec![
        CollectionInfo {
            name: "agri-market",
            description: "Eleven aT/KAMIS price APIs, CSV data and schema summaries",
            aliases: &["kamis"],
            warehouse: false,
        },
        CollectionInfo {
            name: "agri-market-etl",
            description: "Daily retail prices loaded into raw, dimension and fact tables",
            aliases: &[],
            warehouse: true,
        },
    ]
}
