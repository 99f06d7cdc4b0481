use credo::api::{
    ApiClientConfig, ApiError, ApiRequest, CircuitState, HttpTransport, PrivacyFilter,
    ResilientClient,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ResilientClient {
    client_with(server, |_| {})
}

fn client_with(server: &MockServer, adjust: impl FnOnce(&mut ApiClientConfig)) -> ResilientClient {
    let mut config = ApiClientConfig {
        base_url: server.uri(),
        retry_delay: Duration::from_millis(10),
        privacy_mode: Vec::new(),
        ..Default::default()
    };
    adjust(&mut config);
    ResilientClient::new(config, Arc::new(HttpTransport))
}

#[tokio::test]
async fn test_request_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verdict": "ok"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.request(ApiRequest::get("/v1/check")).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.data["verdict"], "ok");
    assert!(!response.cached);
}

#[tokio::test]
async fn test_404_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.request(ApiRequest::get("/missing")).await;

    match result {
        Err(ApiError::Http { status, retriable }) => {
            assert_eq!(status, 404);
            assert!(!retriable);
        }
        other => panic!("Expected HTTP 404 error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_500_retried_until_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let response = client.request(ApiRequest::get("/flaky")).await.unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_retries_exhausted_surfaces_original_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3) // max_retries 2 -> 3 attempts
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server, |c| c.max_retries = 2);
    let result = client.request(ApiRequest::get("/down")).await;

    match result {
        Err(ApiError::Http { status, retriable }) => {
            assert_eq!(status, 503);
            assert!(retriable);
        }
        other => panic!("Expected HTTP 503 error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cached_response_skips_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verdict": "ok"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let first = client.request(ApiRequest::get("/v1/check")).await.unwrap();
    let second = client.request(ApiRequest::get("/v1/check")).await.unwrap();

    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(second.data, first.data);
}

#[tokio::test]
async fn test_circuit_opens_after_threshold_and_fails_fast() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server, |c| {
        c.max_retries = 0;
        c.circuit_breaker_threshold = 2;
        c.cache_enabled = false;
    });

    for _ in 0..2 {
        let _ = client.request(ApiRequest::get("/broken")).await;
    }
    assert_eq!(client.circuit_state(), CircuitState::Open);

    // Third call never reaches the server (expect(2) above would trip).
    match client.request(ApiRequest::get("/broken")).await {
        Err(ApiError::CircuitOpen(_)) => {}
        other => panic!("Expected circuit-open error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_half_open_probe_recovers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/recovering"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/recovering"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server, |c| {
        c.max_retries = 0;
        c.circuit_breaker_threshold = 2;
        c.circuit_breaker_timeout = Duration::from_millis(50);
        c.cache_enabled = false;
    });

    for _ in 0..2 {
        let _ = client.request(ApiRequest::get("/recovering")).await;
    }
    assert_eq!(client.circuit_state(), CircuitState::Open);

    tokio::time::sleep(Duration::from_millis(80)).await;

    let response = client.request(ApiRequest::get("/recovering")).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(client.circuit_state(), CircuitState::Closed);
}

#[tokio::test]
async fn test_rate_limit_blocks_before_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server, |c| {
        c.requests_per_minute = 2;
        c.cache_enabled = false;
    });

    client.request(ApiRequest::get("/a")).await.unwrap();
    client.request(ApiRequest::get("/b")).await.unwrap();
    match client.request(ApiRequest::get("/c")).await {
        Err(ApiError::RateLimited(_)) => {}
        other => panic!("Expected rate-limit error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_privacy_filter_redacts_outgoing_body() {
    let mock_server = MockServer::start().await;

    // The matcher only sees the redacted body; a request carrying the full
    // URL path or a userId would not match and the test would fail on expect.
    Mock::given(method("POST"))
        .and(path("/v1/check"))
        .and(body_partial_json(json!({"url": "example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_with(&mock_server, |c| {
        c.privacy_mode = vec![PrivacyFilter::DomainOnly];
    });

    let body = json!({
        "url": "https://example.com/private/article?id=42",
        "userId": "user-7",
    });
    let response = client
        .request(ApiRequest::post("/v1/check", body))
        .await
        .unwrap();
    assert_eq!(response.status, 200);

    let received = mock_server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert!(sent.get("userId").is_none());
}

#[tokio::test]
async fn test_non_json_response_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    match client.request(ApiRequest::get("/html")).await {
        Err(ApiError::Parse(_)) => {}
        other => panic!("Expected parse error, got {other:?}"),
    }
}
