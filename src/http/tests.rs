//! Tests for the HTTP transport module

use super::*;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Nothing listens on port 1, so connecting is refused
const UNREACHABLE: &str = "http://127.0.0.1:1/rest/13/key/";

fn transport(webhook: &str, proxy: Option<&str>) -> HttpTransport {
    let mut builder = HttpTransportConfig::builder()
        .webhook(webhook)
        .timeout(Duration::from_secs(5));
    if let Some(proxy) = proxy {
        builder = builder.proxy_url(proxy);
    }
    HttpTransport::with_config(builder.build()).unwrap()
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_default() {
    let config = HttpTransportConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.webhook.is_empty());
    assert!(config.proxy_url.is_none());
    assert!(config.user_agent.starts_with("crm-bridge/"));
}

#[test]
fn test_config_builder() {
    let config = HttpTransportConfig::builder()
        .webhook("https://crm.example.com/rest/13/key")
        .proxy_url("https://app.example.com/server/bitrix")
        .timeout(Duration::from_secs(10))
        .header("X-Custom", "value")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.webhook, "https://crm.example.com/rest/13/key/");
    assert_eq!(
        config.proxy_url.as_deref(),
        Some("https://app.example.com/server/bitrix")
    );
    assert_eq!(config.timeout, Duration::from_secs(10));
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_with_config_requires_webhook() {
    let err = HttpTransport::with_config(HttpTransportConfig::default()).unwrap_err();
    assert_eq!(err.kind(), crate::ErrorKind::Configuration);
}

#[test]
fn test_with_config_rejects_invalid_url() {
    let config = HttpTransportConfig::builder().webhook("not a url").build();
    assert!(HttpTransport::with_config(config).is_err());
}

#[test]
fn test_direct_url_encodes_params() {
    let transport = transport("https://crm.example.com/rest/13/key", None);
    assert_eq!(
        transport.direct_url("tasks.task.list", &json!({"filter": {"RESPONSIBLE_ID": "13"}})),
        "https://crm.example.com/rest/13/key/tasks.task.list.json?filter%5BRESPONSIBLE_ID%5D=13"
    );
    assert_eq!(
        transport.direct_url("profile", &json!({})),
        "https://crm.example.com/rest/13/key/profile.json"
    );
}

// ============================================================================
// Direct Transport Tests
// ============================================================================

#[tokio::test]
async fn test_direct_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/13/key/tasks.task.list.json"))
        .and(query_param("filter[RESPONSIBLE_ID]", "13"))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"tasks": [{"id": "1"}]},
            "total": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport(&format!("{}/rest/13/key", server.uri()), None);
    let body = transport
        .send(
            Transport::Direct,
            "tasks.task.list",
            &json!({"filter": {"RESPONSIBLE_ID": "13"}, "start": 0}),
        )
        .await
        .unwrap();

    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_direct_empty_body_is_empty_object() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/profile.json"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let transport = transport(&format!("{}/rest", server.uri()), None);
    let body = transport
        .send(Transport::Direct, "profile", &json!({}))
        .await
        .unwrap();
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_direct_http_error_is_rejection_with_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/profile.json"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let transport = transport(&format!("{}/rest", server.uri()), None);
    let err = transport
        .send(Transport::Direct, "profile", &json!({}))
        .await
        .unwrap_err();

    match &err {
        TransportError::RemoteRejection {
            transport, status, ..
        } => {
            assert_eq!(*transport, Transport::Direct);
            assert_eq!(*status, 403);
        }
        other => panic!("Expected RemoteRejection, got {other:?}"),
    }
    assert!(err.message().contains("HTTP 403"));
    assert!(err.message().contains("forbidden"));
    assert!(err.message().contains("access denied"));
}

#[tokio::test]
async fn test_direct_application_error_is_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/tasks.task.list.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "ACCESS_DENIED",
            "error_description": "Method not allowed for this webhook"
        })))
        .mount(&server)
        .await;

    let transport = transport(&format!("{}/rest", server.uri()), None);
    let err = transport
        .send(Transport::Direct, "tasks.task.list", &json!({}))
        .await
        .unwrap_err();

    assert!(!err.is_network_failure());
    assert_eq!(
        err,
        TransportError::rejected(
            Transport::Direct,
            200,
            "Method not allowed for this webhook"
        )
    );
}

#[tokio::test]
async fn test_direct_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/profile.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let transport = transport(&format!("{}/rest", server.uri()), None);
    let err = transport
        .send(Transport::Direct, "profile", &json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::MalformedBody { .. }));
}

#[tokio::test]
async fn test_direct_unreachable_is_network_failure() {
    let transport = transport(UNREACHABLE, None);
    let err = transport
        .send(Transport::Direct, "profile", &json!({}))
        .await
        .unwrap_err();

    assert!(err.is_network_failure());
    assert_eq!(err.transport(), Transport::Direct);
}

// ============================================================================
// Proxy Transport Tests
// ============================================================================

#[tokio::test]
async fn test_proxy_posts_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/server/bitrix"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "webhook": "https://crm.example.com/rest/13/key/",
            "method": "tasks.task.list",
            "params": {"start": 50}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": []})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport(
        "https://crm.example.com/rest/13/key",
        Some(&format!("{}/server/bitrix", server.uri())),
    );
    let body = transport
        .send(Transport::Proxy, "tasks.task.list", &json!({"start": 50}))
        .await
        .unwrap();
    assert_eq!(body, json!({"result": []}));
}

#[tokio::test]
async fn test_proxy_error_uses_description() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/server/bitrix"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({
            "error": "upstream failed",
            "details": "timeout"
        })))
        .mount(&server)
        .await;

    let transport = transport(
        "https://crm.example.com/rest",
        Some(&format!("{}/server/bitrix", server.uri())),
    );
    let err = transport
        .send(Transport::Proxy, "profile", &json!({}))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TransportError::rejected(
            Transport::Proxy,
            502,
            "proxy returned HTTP 502 Bad Gateway: upstream failed"
        )
    );
}

#[tokio::test]
async fn test_proxy_error_falls_back_to_raw_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/server/bitrix"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let transport = transport(
        "https://crm.example.com/rest",
        Some(&format!("{}/server/bitrix", server.uri())),
    );
    let err = transport
        .send(Transport::Proxy, "profile", &json!({}))
        .await
        .unwrap_err();

    assert!(err.message().ends_with(": boom"));
}

#[tokio::test]
async fn test_proxy_without_endpoint_is_network_failure() {
    let transport = transport("https://crm.example.com/rest", None);
    let err = transport
        .send(Transport::Proxy, "profile", &json!({}))
        .await
        .unwrap_err();
    assert!(err.is_network_failure());
    assert_eq!(err.transport(), Transport::Proxy);
}

// ============================================================================
// TransportError Tests
// ============================================================================

#[test]
fn test_transport_error_with_suffix_keeps_variant() {
    let err = TransportError::malformed(Transport::Proxy, "bad").with_suffix(" (more)");
    assert_eq!(err, TransportError::malformed(Transport::Proxy, "bad (more)"));
    assert_eq!(err.to_string(), "proxy transport returned malformed body: bad (more)");
}
