//! YAML parser for collection definitions
//!
//! Parses and validates collection YAML files.
//! Supports both built-in collections (by name) and custom YAML files (by path).

use crate::config::{CollectionConfig, Endpoint, WarehouseConfig};
use crate::connectors;
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use url::Url;

/// Load a collection definition from a name or file path
///
/// This function first checks if the input is a built-in collection name
/// (e.g., "agri-market"), then falls back to loading from a file path.
///
/// # Examples
///
/// ```ignore
/// // Load built-in collection by name
/// let config = load_collection("agri-market")?;
///
/// // Load custom collection from file
/// let config = load_collection("./my-collection.yaml")?;
/// ```
pub fn load_collection(path: impl AsRef<Path>) -> Result<CollectionConfig> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    // Built-in names have no path separators and no .yaml extension
    if !path_str.contains('/')
        && !path_str.contains('\\')
        && !path_str.ends_with(".yaml")
        && !path_str.ends_with(".yml")
    {
        if let Some(yaml) = connectors::get_builtin(&path_str) {
            return load_collection_from_str(yaml);
        }
    }

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            let builtin_list = connectors::list_builtin().join(", ");
            Error::config(format!(
                "Collection '{}' not found. Built-in collections: {}. Or provide a path to a YAML file.",
                path.display(),
                builtin_list
            ))
        } else {
            Error::config(format!(
                "Failed to read collection file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_collection_from_str(&content)
}

/// Load a collection definition from a YAML string
pub fn load_collection_from_str(yaml: &str) -> Result<CollectionConfig> {
    let config: CollectionConfig = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse collection YAML: {e}")))?;

    validate_collection(&config)?;
    Ok(config)
}

/// Validate a collection definition
pub fn validate_collection(config: &CollectionConfig) -> Result<()> {
    if config.name.trim().is_empty() {
        return Err(Error::config("Collection name cannot be empty"));
    }

    if config.endpoints.is_empty() {
        return Err(Error::config("Collection must have at least one endpoint"));
    }

    let names: HashSet<_> = config.endpoints.iter().map(|e| &e.name).collect();
    if names.len() != config.endpoints.len() {
        return Err(Error::config("Duplicate endpoint names found"));
    }

    for endpoint in &config.endpoints {
        validate_endpoint(endpoint)?;
    }

    if config.pagination.page_size == 0 {
        return Err(Error::invalid_value(
            "pagination.page_size",
            "must be at least 1",
        ));
    }
    if config.pagination.max_pages == 0 {
        return Err(Error::invalid_value(
            "pagination.max_pages",
            "must be at least 1",
        ));
    }
    if config.http.timeout_secs == 0 {
        return Err(Error::invalid_value("http.timeout_secs", "must be at least 1"));
    }

    if let Some(warehouse) = &config.warehouse {
        validate_warehouse(warehouse, config)?;
    }

    Ok(())
}

/// Validate an endpoint definition
fn validate_endpoint(endpoint: &Endpoint) -> Result<()> {
    if endpoint.name.is_empty() {
        return Err(Error::config("Endpoint name cannot be empty"));
    }

    // Names become file and table names
    if !endpoint
        .name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(Error::invalid_value(
            format!("endpoints.{}.name", endpoint.name),
            "only ASCII letters, digits, '_' and '-' are allowed",
        ));
    }

    let url = Url::parse(&endpoint.url).map_err(|e| {
        Error::invalid_value(format!("endpoints.{}.url", endpoint.name), e.to_string())
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::invalid_value(
            format!("endpoints.{}.url", endpoint.name),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.query().is_some() {
        return Err(Error::invalid_value(
            format!("endpoints.{}.url", endpoint.name),
            "put query parameters under 'params'",
        ));
    }
    if endpoint
        .items_path
        .as_deref()
        .is_some_and(|p| p.trim().trim_start_matches("$.").is_empty())
    {
        return Err(Error::invalid_value(
            format!("endpoints.{}.items_path", endpoint.name),
            "path cannot be empty",
        ));
    }

    Ok(())
}

/// Validate the warehouse section
fn validate_warehouse(warehouse: &WarehouseConfig, config: &CollectionConfig) -> Result<()> {
    if warehouse.database.trim().is_empty() {
        return Err(Error::missing_field("warehouse.database"));
    }

    for mapping in &warehouse.mappings {
        if mapping.table.trim().is_empty() {
            return Err(Error::config("Warehouse mapping table cannot be empty"));
        }
        if mapping.columns.is_empty() {
            return Err(Error::config(format!(
                "Warehouse mapping '{}' must map at least one column",
                mapping.table
            )));
        }
        if let Some(unknown) = mapping
            .endpoints
            .iter()
            .find(|name| config.endpoint(name).is_none())
        {
            return Err(Error::config(format!(
                "Warehouse mapping '{}' references unknown endpoint '{}'",
                mapping.table, unknown
            )));
        }
    }

    Ok(())
}
