//! Startup and serving integration tests
//!
//! - missing credentials stop startup before any socket is bound
//! - a configured proxy serves on loopback and shuts down cleanly

use std::time::Duration;

use litellm_local_proxy::{run, AppError, Config};
use pretty_assertions::assert_eq;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use crate::common::{config_with, free_port, test_config};
use crate::mocks::MockUpstream;

fn with_port(mut config: Config, port: u16) -> Config {
    config.listen_port = port;
    config
}

async fn assert_port_is_free(port: u16) {
    assert!(
        TcpStream::connect(("127.0.0.1", port)).await.is_err(),
        "nothing should be listening on {}",
        port
    );
    TcpListener::bind(("127.0.0.1", port))
        .await
        .expect("port must still be bindable");
}

#[tokio::test]
async fn test_empty_user_key_fails_before_binding() {
    let port = free_port().await;
    let config = with_port(config_with("https://up.example/v1", "", "e@x.com"), port);

    let err = run(config, std::future::pending())
        .await
        .expect_err("startup must fail without a user key");

    match err.downcast_ref::<AppError>() {
        Some(AppError::MissingCredential(key)) => assert_eq!(*key, "LITELLM_USER_KEY"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_port_is_free(port).await;
}

#[tokio::test]
async fn test_invalid_base_url_fails_before_binding() {
    let port = free_port().await;
    let config = with_port(config_with("not a url", "k1", "e@x.com"), port);

    let err = run(config, std::future::pending())
        .await
        .expect_err("startup must fail with a malformed base URL");

    match err.downcast_ref::<AppError>() {
        Some(AppError::InvalidConfig(message)) => assert!(message.contains("LITELLM_BASE_URL")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_port_is_free(port).await;
}

#[tokio::test]
async fn test_empty_user_email_fails_before_binding() {
    let port = free_port().await;
    let config = with_port(config_with("https://up.example/v1", "k1", "  "), port);

    let err = run(config, std::future::pending())
        .await
        .expect_err("startup must fail without a user email");

    match err.downcast_ref::<AppError>() {
        Some(AppError::MissingCredential(key)) => assert_eq!(*key, "LITELLM_USER_EMAIL"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_port_is_free(port).await;
}

#[tokio::test]
async fn test_run_serves_on_loopback_until_shutdown() {
    let upstream = MockUpstream::start().await;
    upstream.mock_chat_completion_success().await;

    let port = free_port().await;
    let config = with_port(test_config(&upstream.base_url()), port);
    let (tx, rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(run(config, async move {
        let _ = rx.await;
    }));

    // Wait for the listener to come up
    let mut ready = false;
    for _ in 0..50 {
        if TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
            ready = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(ready, "proxy did not start listening on {}", port);

    let response = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{}/chat/completions", port))
        .header("authorization", "Bearer z")
        .body(r#"{"a":1}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    tx.send(()).unwrap();
    handle.await.unwrap().unwrap();

    assert_port_is_free(port).await;
}
