//! Client configuration, concurrency and cancellation tests

use crate::fixtures::*;
use crate::helpers::*;
use crate::mock_ollama::*;
use ollama_sdk::{
    resolve_host, CallContext, CancelHandle, ChatRequest, Client, ClientConfig, Error, Message,
};
use pretty_assertions::assert_eq;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn ping() -> ChatRequest {
    ChatRequest::new(TEST_MODEL, vec![Message::user("ping")])
}

#[tokio::test]
async fn test_default_headers_reach_server() {
    let mock = MockOllama::new().await;
    mock.mock_json("GET", "/api/version", 200, serde_json::json!({"version": "1"}))
        .await;

    mock.client().version().await.unwrap();

    let request = &mock.requests().await[0];
    assert_eq!(request.headers["content-type"], "application/json");
    assert_eq!(request.headers["accept"], "application/json");
    let agent = request.headers["user-agent"].to_str().unwrap();
    assert!(agent.starts_with("ollama-rust/"), "{agent}");
    assert!(agent.ends_with(") Rust"), "{agent}");
}

#[tokio::test]
async fn test_custom_headers_override_defaults() {
    let mock = MockOllama::new().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .and(header("accept", "text/plain"))
        .and(header("x-some-header", "some-value"))
        .and(header("user-agent", "my-app/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tags_response()))
        .expect(1)
        .mount(&mock.server)
        .await;

    let client = Client::builder()
        .host(mock.url())
        .header("Accept", "text/plain")
        .header("X-Some-Header", "some-value")
        .user_agent("my-app/1.0")
        .build()
        .unwrap();
    client.list().await.unwrap();

    let request = &mock.requests().await[0];
    assert_eq!(request.headers.get_all("accept").iter().count(), 1);
}

#[tokio::test]
async fn test_host_with_path_prefix() {
    let mock = MockOllama::new().await;
    mock.mock_json(
        "GET",
        "/proxy/ollama/api/version",
        200,
        serde_json::json!({"version": "2"}),
    )
    .await;

    let client = client_for(&format!("{}/proxy/ollama/", mock.url()));
    assert!(client.base_url().to_string().ends_with("/proxy/ollama"));
    assert_eq!(client.version().await.unwrap().version, "2");
}

#[tokio::test]
async fn test_host_from_environment() {
    let mock = MockOllama::new().await;
    mock.mock_json("GET", "/api/version", 200, serde_json::json!({"version": "env"}))
        .await;

    let env_value = mock.url();
    let client = Client::new(ClientConfig::new(resolve_host(None, Some(&env_value)))).unwrap();

    assert_eq!(client.version().await.unwrap().version, "env");
    assert_eq!(
        resolve_host(Some(&env_value), Some("unreachable.invalid")).to_string(),
        client.base_url().to_string()
    );
}

#[tokio::test]
async fn test_concurrent_calls_share_one_client() {
    let mock = MockOllama::new().await;
    mock.mock_chat("pong").await;
    let client = mock.client();

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.chat(&ping()).await })
        })
        .collect();

    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.message.content(), "pong");
    }
    assert_eq!(mock.requests().await.len(), 50);
}

#[tokio::test]
async fn test_cancelled_before_send() {
    let mock = MockOllama::new().await;
    mock.expect_no_requests().await;

    let handle = CancelHandle::new();
    handle.cancel();
    let client = mock
        .client()
        .with_context(CallContext::background().with_cancel(handle.signal()));

    let err = client.chat(&ping()).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn test_cancelled_while_in_flight() {
    let mock = MockOllama::new().await;
    mock.mock_chat_delayed("late", Duration::from_secs(10)).await;

    let handle = CancelHandle::new();
    let client = mock
        .client()
        .with_context(CallContext::background().with_cancel(handle.signal()));

    let call = tokio::spawn(async move { client.chat(&ping()).await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.cancel();

    let err = tokio::time::timeout(Duration::from_secs(5), call)
        .await
        .expect("cancellation did not interrupt the call")
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn test_deadline_exceeded() {
    let mock = MockOllama::new().await;
    mock.mock_chat_delayed("late", Duration::from_secs(10)).await;

    let client = mock
        .client()
        .with_context(CallContext::background().with_timeout(Duration::from_millis(200)));

    let err = client.chat(&ping()).await.unwrap_err();
    assert!(matches!(err, Error::DeadlineExceeded { duration_ms: 200 }));
}

#[tokio::test]
async fn test_context_is_per_clone() {
    let mock = MockOllama::new().await;
    mock.mock_chat("pong").await;

    let handle = CancelHandle::new();
    handle.cancel();
    let base = mock.client();
    let cancelled = base.with_context(CallContext::background().with_cancel(handle.signal()));

    assert!(cancelled.chat(&ping()).await.is_err());
    assert_eq!(base.chat(&ping()).await.unwrap().message.content(), "pong");
}
