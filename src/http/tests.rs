//! Tests for the HTTP client module

use super::*;
use crate::pagination::{PageFetcher, PageRequest};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(url: String, query: &[(&str, &str)]) -> PageRequest {
    PageRequest {
        url,
        query: query
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect(),
        page: 1,
    }
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.default_query.is_empty());
    assert!(config.user_agent.starts_with("agri-explorer/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .timeout(Duration::from_secs(60))
        .header("X-Custom", "value")
        .query("serviceKey", "abc")
        .query("returnType", "JSON")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
    assert_eq!(
        config.default_query,
        vec![
            ("serviceKey".to_string(), "abc".to_string()),
            ("returnType".to_string(), "JSON".to_string()),
        ]
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[tokio::test]
async fn test_fetch_page_sends_page_and_default_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/B552845/perDay/price"))
        .and(query_param("cond[exmn_ymd::GTE]", "20250101"))
        .and(query_param("pageNo", "2"))
        .and(query_param("numOfRows", "100"))
        .and(query_param("serviceKey", "test-key"))
        .and(query_param("returnType", "JSON"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json;charset=UTF-8")
                .set_body_bytes(r#"{"items": []}"#.as_bytes()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .query("serviceKey", "test-key")
        .query("returnType", "JSON")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let page = client
        .fetch_page(&request(
            format!("{}/B552845/perDay/price", mock_server.uri()),
            &[
                ("cond[exmn_ymd::GTE]", "20250101"),
                ("pageNo", "2"),
                ("numOfRows", "100"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(page.body, r#"{"items": []}"#);
    assert!(page
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("application/json")));
}

#[tokio::test]
async fn test_http_client_custom_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/secure"))
        .and(header("X-API-Key", "secret123"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<ok/>"))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .header("X-API-Key", "secret123")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let page = client
        .get_text(&format!("{}/secure", mock_server.uri()), &[])
        .await
        .unwrap();
    assert_eq!(page.body, "<ok/>");
}

#[tokio::test]
async fn test_http_client_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new().unwrap();
    let result = client
        .get_text(&format!("{}/missing", mock_server.uri()), &[])
        .await;

    match result {
        Err(err @ crate::error::Error::HttpStatus { .. }) => {
            assert!(err.is_transport());
            if let crate::error::Error::HttpStatus { status, body } = err {
                assert_eq!(status, 404);
                assert_eq!(body, "Not found");
            }
        }
        other => panic!("Expected HttpStatus error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_client_server_error_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpClient::new().unwrap();
    let err = client
        .get_text(&format!("{}/flaky", mock_server.uri()), &[])
        .await
        .unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_http_client_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .timeout(Duration::from_millis(50))
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let err = client
        .get_text(&format!("{}/slow", mock_server.uri()), &[])
        .await
        .unwrap_err();
    assert!(err.is_transport());
}
