//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: YAML collection → paginated HTTP requests →
//! CSV outputs and run report

use agri_explorer::engine::{Collector, EndpointOutcome};
use agri_explorer::http::HttpClient;
use agri_explorer::loader::load_collection_from_str;
use agri_explorer::output::{CsvSink, CsvWriterConfig, ALL_SUMMARY_FILE};
use agri_explorer::pagination::StopReason;
use agri_explorer::warehouse::Warehouse;
use agri_explorer::CollectionConfig;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn collection(server: &MockServer) -> CollectionConfig {
    let yaml = format!(
        r#"
name: mock-market
service_key: test-key
pagination:
  page_size: 100
  max_pages: 5
  delay_ms: 0
endpoints:
  - name: perDay_price
    url: {uri}/perDay/price
    params:
      "cond[exmn_ymd::GTE]": "20250101"
  - name: recent_price
    url: {uri}/recent/price
  - name: broken_price
    url: {uri}/broken/price
"#,
        uri = server.uri()
    );
    load_collection_from_str(&yaml).unwrap()
}

fn collector(config: &CollectionConfig, dir: &Path) -> Collector<HttpClient> {
    let client =
        HttpClient::with_config(config.http_client_config(config.resolve_service_key().as_deref()))
            .unwrap();
    let sink = CsvSink::new(dir, CsvWriterConfig::new());
    Collector::new(client, config.pagination_config(), sink)
}

/// JSON page of the data.go.kr envelope holding items `start..end` of `total`
fn json_page(start: usize, end: usize, total: usize) -> serde_json::Value {
    let items: Vec<_> = (start..end)
        .map(|i| {
            json!({
                "exmn_ymd": format!("202501{:02}", i % 28 + 1),
                "item_cd": format!("{}", 100 + i % 3),
                "item_nm": "배추",
                "exmn_dd_prc": (1000 + i).to_string()
            })
        })
        .collect();
    json!({
        "response": {
            "header": {"resultCode": "00", "resultMsg": "NORMAL SERVICE."},
            "body": {
                "items": {"item": items},
                "numOfRows": 100,
                "pageNo": 1,
                "totalCount": total
            }
        }
    })
}

async fn mount_paged_json(server: &MockServer) {
    for (page, (start, end)) in [(0, 100), (100, 200), (200, 250)].into_iter().enumerate() {
        Mock::given(method("GET"))
            .and(path("/perDay/price"))
            .and(query_param("pageNo", (page + 1).to_string()))
            .and(query_param("numOfRows", "100"))
            .and(query_param("serviceKey", "test-key"))
            .and(query_param("returnType", "JSON"))
            .and(query_param("cond[exmn_ymd::GTE]", "20250101"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json_page(start, end, 250)))
            .expect(1)
            .mount(server)
            .await;
    }
}

async fn mount_xml(server: &MockServer) {
    let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<response>
  <header><resultCode>00</resultCode></header>
  <body>
    <items>
      <item><exmn_ymd>20250101</exmn_ymd><item_nm>쌀</item_nm><prc>52000</prc></item>
      <item><exmn_ymd>20250102</exmn_ymd><item_nm>쌀</item_nm><prc/></item>
    </items>
  </body>
</response>"#;

    Mock::given(method("GET"))
        .and(path("/recent/price"))
        .and(query_param("pageNo", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/xml")
                .set_body_bytes(body.as_bytes().to_vec()),
        )
        .expect(1)
        .mount(server)
        .await;
}

// ============================================================================
// End-to-End Tests
// ============================================================================

#[tokio::test]
async fn test_collect_end_to_end() {
    let server = MockServer::start().await;
    mount_paged_json(&server).await;
    mount_xml(&server).await;

    let config = collection(&server);
    let dir = tempfile::tempdir().unwrap();
    let mut collector = collector(&config, dir.path());

    let endpoints = config.select_endpoints(&[]).unwrap();
    let report = collector.run(&endpoints).await.unwrap();

    assert_eq!(report.endpoints.len(), 3);
    assert_eq!(report.collected(), 2);
    assert_eq!(report.failed(), 1);
    assert!(!report.all_failed());
    assert_eq!(report.total_rows(), 252);

    assert_eq!(
        report.endpoints[0].outcome,
        EndpointOutcome::Collected {
            rows: 250,
            pages: 3,
            stop_reason: StopReason::TotalCountReached,
            total_count: Some(250),
            columns: 4,
            loads: Vec::new(),
        }
    );
    match &report.endpoints[1].outcome {
        EndpointOutcome::Collected {
            rows,
            pages,
            stop_reason,
            total_count,
            ..
        } => {
            assert_eq!(*rows, 2);
            assert_eq!(*pages, 1);
            assert_eq!(*stop_reason, StopReason::ShortPage);
            assert_eq!(*total_count, None);
        }
        other => panic!("expected XML endpoint to be collected, got {other:?}"),
    }
    assert!(report.endpoints[2].outcome.is_failed());

    // Data file: BOM, header in first-seen order, one line per record
    let data = std::fs::read(dir.path().join("perDay_price_data.csv")).unwrap();
    assert!(data.starts_with(b"\xEF\xBB\xBF"));
    let data = String::from_utf8(data[3..].to_vec()).unwrap();
    let mut lines = data.lines();
    assert_eq!(lines.next(), Some("exmn_ymd,item_cd,item_nm,exmn_dd_prc"));
    assert_eq!(lines.count(), 250);

    let sample = std::fs::read_to_string(dir.path().join("perDay_price_sample.csv")).unwrap();
    assert_eq!(sample.lines().count(), 11);

    // Per-endpoint summary, sorted by column name
    let summary =
        std::fs::read_to_string(dir.path().join("recent_price_schema_summary.csv")).unwrap();
    let rows: Vec<&str> = summary.trim_start_matches('\u{feff}').lines().collect();
    assert_eq!(
        rows,
        vec![
            "column,inferred_type,missing_rate,nunique,min,max",
            "exmn_ymd,date,0.0,2,20250101,20250102",
            "item_nm,string,0.0,1,1,1",
            "prc,int,0.5,1,52000.0,52000.0",
        ]
    );

    // Combined summary covers the two profiled endpoints only
    let combined = std::fs::read_to_string(dir.path().join(ALL_SUMMARY_FILE)).unwrap();
    let combined: Vec<&str> = combined.trim_start_matches('\u{feff}').lines().collect();
    assert_eq!(
        combined[0],
        "column,inferred_type,missing_rate,nunique,min,max,api_name"
    );
    assert_eq!(combined.len(), 1 + 4 + 3);
    assert!(combined
        .iter()
        .any(|l| *l == "exmn_dd_prc,int,0.0,250,1000.0,1249.0,perDay_price"));
    assert!(!combined.iter().any(|l| l.ends_with(",broken_price")));
    assert!(!dir.path().join("broken_price_data.csv").exists());
}

#[tokio::test]
async fn test_collect_selected_endpoint_only() {
    let server = MockServer::start().await;
    mount_xml(&server).await;

    let config = collection(&server);
    let dir = tempfile::tempdir().unwrap();
    let mut collector = collector(&config, dir.path());

    let endpoints = config
        .select_endpoints(&["recent_price".to_string()])
        .unwrap();
    let report = collector.run(&endpoints).await.unwrap();

    assert_eq!(report.endpoints.len(), 1);
    assert_eq!(report.endpoints[0].name, "recent_price");
    assert!(!dir.path().join("perDay_price_data.csv").exists());
}

#[tokio::test]
async fn test_every_endpoint_failing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let config = collection(&server);
    let dir = tempfile::tempdir().unwrap();
    let mut collector = collector(&config, dir.path());

    let endpoints = config.select_endpoints(&[]).unwrap();
    let report = collector.run(&endpoints).await.unwrap();

    assert!(report.all_failed());
    assert_eq!(report.combined_summary, None);
    for endpoint in &report.endpoints {
        match &endpoint.outcome {
            EndpointOutcome::Failed { error } => assert!(error.contains("503")),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_api_error_envelope_fails_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recent/price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"header": {"resultCode": "30", "resultMsg": "SERVICE KEY IS NOT REGISTERED ERROR."}}
        })))
        .mount(&server)
        .await;

    let config = collection(&server);
    let dir = tempfile::tempdir().unwrap();
    let mut collector = collector(&config, dir.path());

    let endpoints = config
        .select_endpoints(&["recent_price".to_string()])
        .unwrap();
    let report = collector.run(&endpoints).await.unwrap();
    assert!(report.all_failed());
}

#[tokio::test]
async fn test_collect_into_warehouse() {
    let server = MockServer::start().await;
    mount_paged_json(&server).await;

    let config = collection(&server);
    let dir = tempfile::tempdir().unwrap();

    let warehouse = Warehouse::in_memory().unwrap();
    warehouse
        .execute_batch(
            "CREATE TABLE raw_perDay_price (
                 exmn_ymd DATE, item_cd VARCHAR, item_nm VARCHAR, exmn_dd_prc INTEGER
             );
             CREATE TABLE dim_item (item_cd VARCHAR PRIMARY KEY, item_nm VARCHAR);",
        )
        .unwrap();
    let warehouse_config = load_collection_from_str(
        r#"
name: wh
warehouse:
  database: ":memory:"
  mappings:
    - table: dim_item
      ignore_duplicates: true
      columns:
        - { source: item_cd, target: item_cd }
        - { source: item_nm, target: item_nm }
endpoints:
  - { name: perDay_price, url: "http://localhost/perDay/price" }
"#,
    )
    .unwrap()
    .warehouse
    .unwrap();

    let mut collector = collector(&config, dir.path()).with_warehouse(warehouse, warehouse_config);
    let endpoints = config
        .select_endpoints(&["perDay_price".to_string()])
        .unwrap();
    let report = collector.run(&endpoints).await.unwrap();

    let EndpointOutcome::Collected { loads, .. } = &report.endpoints[0].outcome else {
        panic!("expected collected outcome");
    };
    assert_eq!(loads[0].table, "raw_perDay_price");
    assert_eq!(loads[0].inserted, 250);
    assert!(loads[0].ignored_fields.is_empty());
    assert_eq!(loads[1].table, "dim_item");
}
