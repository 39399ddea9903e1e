//! Response relay integration tests
//!
//! The caller must receive exactly what upstream answered: status,
//! headers and body, including upstream error statuses.

use axum::http::StatusCode;
use bytes::Bytes;
use pretty_assertions::assert_eq;
use serde_json::Value;
use wiremock::ResponseTemplate;

use crate::common::{test_config, test_server, RunningProxy};
use crate::mocks::{chat_completion_body, MockUpstream};

#[tokio::test]
async fn test_success_body_is_relayed() {
    let upstream = MockUpstream::start().await;
    upstream.mock_chat_completion_success().await;
    let server = test_server(&upstream.base_url());

    let response = server
        .post("/chat/completions")
        .bytes(Bytes::from_static(br#"{"model":"gpt-4o","messages":[]}"#))
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json, chat_completion_body());
}

#[tokio::test]
async fn test_status_headers_and_raw_body_are_relayed() {
    let upstream = MockUpstream::start().await;
    upstream
        .mock_any_post(
            ResponseTemplate::new(201)
                .insert_header("x-litellm-call-id", "call-42")
                .insert_header("x-ratelimit-remaining-requests", "99")
                .set_body_raw(b"not json at all".to_vec(), "text/plain"),
        )
        .await;
    let server = test_server(&upstream.base_url());

    let response = server.post("/completions").bytes(Bytes::new()).await;

    response.assert_status(StatusCode::CREATED);
    let headers = response.headers();
    assert_eq!(headers["x-litellm-call-id"], "call-42");
    assert_eq!(headers["x-ratelimit-remaining-requests"], "99");
    assert_eq!(headers["content-type"], "text/plain");
    assert_eq!(response.as_bytes().as_ref(), b"not json at all");
}

#[tokio::test]
async fn test_upstream_error_status_is_relayed_not_rewritten() {
    let upstream = MockUpstream::start().await;
    upstream.mock_unauthorized().await;
    let server = test_server(&upstream.base_url());

    let response = server
        .post("/chat/completions")
        .bytes(Bytes::from_static(b"{}"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["x-litellm-error"], "auth");
    let json: Value = response.json();
    assert_eq!(json["error"]["type"], "auth_error");
}

#[tokio::test]
async fn test_upstream_server_error_is_relayed() {
    let upstream = MockUpstream::start().await;
    upstream
        .mock_any_post(ResponseTemplate::new(503).set_body_string("overloaded"))
        .await;
    let server = test_server(&upstream.base_url());

    let response = server.post("/chat/completions").bytes(Bytes::new()).await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.text(), "overloaded");
}

/// Compare a direct upstream call with the same call through the proxy
#[tokio::test]
async fn test_round_trip_identity_over_real_sockets() {
    let upstream = MockUpstream::start().await;
    upstream
        .mock_any_post(
            ResponseTemplate::new(202)
                .insert_header("x-request-id", "req-7")
                .insert_header("cache-control", "no-store")
                .set_body_raw(br#"{"ok":true}"#.to_vec(), "application/json"),
        )
        .await;
    let proxy = RunningProxy::start(test_config(&upstream.base_url())).await;
    let client = reqwest::Client::new();

    let direct = client
        .post(upstream.url("/v1/anything"))
        .body("{}")
        .send()
        .await
        .unwrap();
    let proxied = client
        .post(proxy.url("/anything"))
        .body("{}")
        .send()
        .await
        .unwrap();

    assert_eq!(proxied.status(), direct.status());

    // `date` is regenerated per response by the upstream server
    let comparable = |headers: &reqwest::header::HeaderMap| {
        let mut pairs: Vec<(String, String)> = headers
            .iter()
            .filter(|(name, _)| name.as_str() != "date")
            .map(|(name, value)| (name.to_string(), value.to_str().unwrap().to_string()))
            .collect();
        pairs.sort();
        pairs
    };
    assert_eq!(comparable(proxied.headers()), comparable(direct.headers()));

    let direct_body = direct.bytes().await.unwrap();
    let proxied_body = proxied.bytes().await.unwrap();
    assert_eq!(proxied_body, direct_body);

    drop(client);
    proxy.stop().await.unwrap();
}
