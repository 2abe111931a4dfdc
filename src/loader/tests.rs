//! Tests for YAML loader module

use super::*;
use crate::config::WarehouseEngine;
use crate::types::ReturnType;
use pretty_assertions::assert_eq;
use std::time::Duration;

// ============================================================================
// Basic Loading Tests
// ============================================================================

#[test]
fn test_load_minimal_collection() {
    let yaml = r#"
name: test-collection
endpoints:
  - name: perDay_price
    url: https://apis.example.com/perDay/price
"#;

    let config = load_collection_from_str(yaml).unwrap();
    assert_eq!(config.name, "test-collection");
    assert_eq!(config.endpoints.len(), 1);
    assert!(config.endpoints[0].params.is_empty());
    assert_eq!(config.service_key_env, "DATA_GO_KR_KEY");
    assert_eq!(config.return_type, ReturnType::Json);
    assert_eq!(config.http.timeout_secs, 30);
    assert_eq!(config.pagination.page_size, 100);
    assert_eq!(config.pagination.max_pages, 50);
    assert_eq!(config.pagination.delay_ms, 200);
    assert_eq!(config.output.sample_rows, 10);
    assert!(config.output.bom);
    assert!(config.warehouse.is_none());
}

#[test]
fn test_load_full_collection() {
    let yaml = r#"
name: custom
service_key: literal-key
return_type: XML
http:
  timeout_secs: 5
  user_agent: probe/1.0
  headers:
    Accept: application/xml
pagination:
  page_size: 500
  max_pages: 10
  delay_ms: 0
output:
  dir: /tmp/out
  sample_rows: 3
  bom: false
warehouse:
  engine: mysql
  database: "host=localhost user=etl database=agri"
  mappings:
    - table: dim_item
      endpoints: [periodRetail_price]
      ignore_duplicates: true
      columns:
        - { source: item_cd, target: item_cd }
endpoints:
  - name: periodRetail_price
    url: https://apis.example.com/periodRetail/price
    params:
      "cond[exmn_ymd::GTE]": "20250101"
      "cond[exmn_ymd::LTE]": "20250102"
"#;

    let config = load_collection_from_str(yaml).unwrap();
    assert_eq!(config.return_type, ReturnType::Xml);
    assert_eq!(config.resolve_service_key().as_deref(), Some("literal-key"));
    assert_eq!(config.output.sample_rows, 3);
    assert!(!config.output.bom);

    let endpoint = config.endpoint("periodRetail_price").unwrap();
    assert_eq!(
        endpoint.params.get("cond[exmn_ymd::LTE]").map(String::as_str),
        Some("20250102")
    );

    let warehouse = config.warehouse.as_ref().unwrap();
    assert_eq!(warehouse.engine, WarehouseEngine::MySql);
    assert_eq!(warehouse.raw_table_prefix, "raw_");
    assert!(warehouse.load_raw);
    assert_eq!(warehouse.mappings_for("periodRetail_price").count(), 1);
    assert_eq!(warehouse.mappings_for("other").count(), 0);

    let pagination = config.pagination_config();
    assert_eq!(pagination.page_size, 500);
    assert_eq!(pagination.max_pages, 10);
    assert_eq!(pagination.delay, Duration::ZERO);

    let http = config.http_client_config(Some("k"));
    assert_eq!(http.timeout, Duration::from_secs(5));
    assert_eq!(http.user_agent, "probe/1.0");
    assert!(http
        .default_query
        .contains(&("returnType".to_string(), "XML".to_string())));
    assert!(http
        .default_query
        .contains(&("serviceKey".to_string(), "k".to_string())));
}

#[test]
fn test_http_config_without_service_key() {
    let config = load_collection("agri-market").unwrap();
    let http = config.http_client_config(None);
    assert_eq!(
        http.default_query,
        vec![("returnType".to_string(), "JSON".to_string())]
    );
}

#[test]
fn test_select_endpoints() {
    let config = load_collection("agri-market").unwrap();
    assert_eq!(config.select_endpoints(&[]).unwrap().len(), 11);

    let picked = config
        .select_endpoints(&["recent_price".to_string(), "perDay_price".to_string()])
        .unwrap();
    let names: Vec<_> = picked.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["perDay_price", "recent_price"]);

    assert!(config
        .select_endpoints(&["nope".to_string()])
        .is_err());
}

// ============================================================================
// Built-in Loading Tests
// ============================================================================

#[test]
fn test_load_builtin_by_name() {
    let config = load_collection("agri-market").unwrap();
    assert_eq!(config.endpoints.len(), 11);
    assert_eq!(config.endpoints[0].name, "perDay_price");
    assert_eq!(
        config.endpoints[0].url,
        "https://apis.data.go.kr/B552845/perDay/price"
    );
    assert_eq!(
        config.endpoint("listingException_dealings").unwrap().params["cond[clcln_ymd::EQ]"],
        "20251231"
    );
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mine.yaml");
    std::fs::write(
        &path,
        "name: mine\nendpoints:\n  - name: a\n    url: http://localhost/a\n",
    )
    .unwrap();

    let config = load_collection(&path).unwrap();
    assert_eq!(config.name, "mine");
}

#[test]
fn test_load_missing_file_lists_builtins() {
    let err = load_collection("does-not-exist").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("not found"));
    assert!(message.contains("agri-market"));
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_reject_no_endpoints() {
    let err = load_collection_from_str("name: empty\n").unwrap_err();
    assert!(err.to_string().contains("at least one endpoint"));
}

#[test]
fn test_reject_duplicate_endpoints() {
    let yaml = r#"
name: dup
endpoints:
  - { name: a, url: "https://x.test/a" }
  - { name: a, url: "https://x.test/b" }
"#;
    let err = load_collection_from_str(yaml).unwrap_err();
    assert!(err.to_string().contains("Duplicate endpoint"));
}

#[test]
fn test_reject_bad_urls() {
    for url in ["not a url", "ftp://x.test/a", "https://x.test/a?pageNo=1"] {
        let yaml = format!("name: bad\nendpoints:\n  - {{ name: a, url: \"{url}\" }}\n");
        assert!(load_collection_from_str(&yaml).is_err(), "accepted {url}");
    }
}

#[test]
fn test_reject_unsafe_endpoint_name() {
    let yaml = r#"
name: bad
endpoints:
  - { name: "../etc", url: "https://x.test/a" }
"#;
    assert!(load_collection_from_str(yaml).is_err());
}

#[test]
fn test_endpoint_items_path() {
    let yaml = r#"
name: custom
endpoints:
  - { name: a, url: "https://x.test/a", items_path: data.rows }
  - { name: b, url: "https://x.test/b" }
"#;
    let config = load_collection_from_str(yaml).unwrap();
    assert_eq!(config.endpoints[0].items_path.as_deref(), Some("data.rows"));
    assert_eq!(config.endpoints[1].items_path, None);

    for path in ["\"\"", "\"$.\""] {
        let yaml = format!(
            "name: bad\nendpoints:\n  - {{ name: a, url: \"https://x.test/a\", items_path: {path} }}\n"
        );
        let err = load_collection_from_str(&yaml).unwrap_err();
        assert!(err.to_string().contains("items_path"), "accepted {path}");
    }
}

#[test]
fn test_reject_zero_page_settings() {
    let yaml = r#"
name: bad
pagination: { page_size: 0 }
endpoints:
  - { name: a, url: "https://x.test/a" }
"#;
    assert!(load_collection_from_str(yaml).is_err());

    let yaml = r#"
name: bad
pagination: { max_pages: 0 }
endpoints:
  - { name: a, url: "https://x.test/a" }
"#;
    assert!(load_collection_from_str(yaml).is_err());
}

#[test]
fn test_reject_mapping_to_unknown_endpoint() {
    let yaml = r#"
name: bad
warehouse:
  database: ":memory:"
  mappings:
    - table: dim_item
      endpoints: [missing]
      columns: [{ source: a, target: a }]
endpoints:
  - { name: a, url: "https://x.test/a" }
"#;
    let err = load_collection_from_str(yaml).unwrap_err();
    assert!(err.to_string().contains("unknown endpoint"));
}

#[test]
fn test_reject_invalid_yaml() {
    assert!(load_collection_from_str("name: [unclosed").is_err());
}
