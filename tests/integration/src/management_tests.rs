//! Model management and blob upload tests

use crate::fixtures::*;
use crate::helpers::*;
use crate::mock_ollama::*;
use ollama_sdk::{
    digest_bytes, CopyRequest, CreateRequest, DeleteRequest, PullRequest, PushRequest,
    ShowRequest,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_list_models() {
    let mock = MockOllama::new().await;
    mock.mock_json("GET", "/api/tags", 200, tags_response()).await;

    let response = mock.client().list().await.unwrap();

    assert_eq!(response.models.len(), 2);
    let first = &response.models[0];
    assert_eq!(first.model.as_deref(), Some("llama3.2:latest"));
    assert_eq!(first.size, Some(2_019_393_189));
    assert!(first.modified_at.is_some());
    assert_eq!(
        first.details.as_ref().unwrap().quantization_level.as_deref(),
        Some("Q4_K_M")
    );
    assert!(response.models[1].details.is_none());
}

#[tokio::test]
async fn test_running_models() {
    let mock = MockOllama::new().await;
    mock.mock_json("GET", "/api/ps", 200, ps_response()).await;

    let response = mock.client().ps().await.unwrap();
    assert_eq!(response.models[0].context_length, Some(4096));
    assert!(response.models[0].expires_at.is_some());
}

#[tokio::test]
async fn test_show_model() {
    let mock = MockOllama::new().await;
    mock.mock_json("POST", "/api/show", 200, show_response()).await;

    let response = mock
        .client()
        .show(&ShowRequest {
            model: TEST_MODEL.to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.capabilities, vec!["completion", "tools"]);
    assert_eq!(response.model_info["general.architecture"], "llama");
    assert_eq!(
        request_json(&mock.requests().await[0]),
        json!({"model": TEST_MODEL})
    );
}

#[tokio::test]
async fn test_version() {
    let mock = MockOllama::new().await;
    mock.mock_json("GET", "/api/version", 200, json!({"version": "0.5.7"}))
        .await;

    assert_eq!(mock.client().version().await.unwrap().version, "0.5.7");
}

#[tokio::test]
async fn test_delete_success_and_error() {
    let mock = MockOllama::new().await;
    mock.mock_status("DELETE", "/api/delete", 200, "").await;

    let client = mock.client();
    let status = client
        .delete(&DeleteRequest {
            model: TEST_MODEL.to_string(),
        })
        .await
        .unwrap();
    assert_eq!(status.status.as_deref(), Some("success"));

    let failing = MockOllama::new().await;
    failing
        .mock_json(
            "DELETE",
            "/api/delete",
            404,
            json!({"error": "model not found"}),
        )
        .await;
    let status = failing
        .client()
        .delete(&DeleteRequest {
            model: "missing".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(status.status.as_deref(), Some("error"));
}

#[tokio::test]
async fn test_delete_unreachable_server_propagates() {
    let client = client_for(&format!("http://127.0.0.1:{}", unused_port()));
    let err = client
        .delete(&DeleteRequest {
            model: TEST_MODEL.to_string(),
        })
        .await
        .unwrap_err();
    assert!(err.is_connection_error());
}

#[tokio::test]
async fn test_copy_model() {
    let mock = MockOllama::new().await;
    mock.mock_status("POST", "/api/copy", 200, "").await;

    let status = mock
        .client()
        .copy(&CopyRequest {
            source: TEST_MODEL.to_string(),
            destination: "llama3.2-backup".to_string(),
        })
        .await
        .unwrap();

    assert!(status.is_success());
    assert_eq!(
        request_json(&mock.requests().await[0]),
        json!({"source": TEST_MODEL, "destination": "llama3.2-backup"})
    );
}

#[tokio::test]
async fn test_pull_single_response() {
    let mock = MockOllama::new().await;
    mock.mock_json("POST", "/api/pull", 200, json!({"status": "success"}))
        .await;

    let progress = mock
        .client()
        .pull(&PullRequest::new(TEST_MODEL))
        .await
        .unwrap();
    assert_eq!(progress.status.as_deref(), Some("success"));
    assert_eq!(
        request_json(&mock.requests().await[0])["stream"],
        json!(false)
    );
}

#[tokio::test]
async fn test_pull_stream_progress() {
    let mock = MockOllama::new().await;
    mock.mock_ndjson("/api/pull", &pull_progress()).await;

    let progress = mock
        .client()
        .pull_stream(&PullRequest::new(TEST_MODEL))
        .await
        .unwrap()
        .collect_all()
        .await
        .unwrap();

    assert_eq!(progress.len(), 4);
    assert_eq!(progress[1].completed, Some(2_330_605_904));
    assert_eq!(progress[3].status.as_deref(), Some("success"));
}

#[tokio::test]
async fn test_push_stream_progress() {
    let mock = MockOllama::new().await;
    mock.mock_ndjson(
        "/api/push",
        &[
            json!({"status": "retrieving manifest"}),
            json!({"status": "success"}),
        ],
    )
    .await;

    let progress = mock
        .client()
        .push_stream(&PushRequest::new("user/model:latest"))
        .await
        .unwrap()
        .collect_all()
        .await
        .unwrap();
    assert_eq!(progress.len(), 2);
}

#[tokio::test]
async fn test_create_from_base_model() {
    let mock = MockOllama::new().await;
    mock.mock_json("POST", "/api/create", 200, json!({"status": "success"}))
        .await;

    let mut request = CreateRequest::from_model("mario", TEST_MODEL);
    request.system = Some("You are Mario from Super Mario Bros.".to_string());
    let progress = mock.client().create(&request).await.unwrap();

    assert_eq!(progress.status.as_deref(), Some("success"));
    assert_json_contains(
        &request_json(&mock.requests().await[0]),
        &json!({"model": "mario", "from": TEST_MODEL, "stream": false}),
    );
}

#[tokio::test]
async fn test_create_blob_uploads_file_bytes() {
    let contents = b"abc".to_vec();
    let digest = digest_bytes(&contents);
    assert_eq!(
        digest,
        "sha256:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&contents).unwrap();

    let mock = MockOllama::new().await;
    Mock::given(method("POST"))
        .and(path(format!("/api/blobs/{digest}")))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock.server)
        .await;

    let returned = mock.client().create_blob(file.path()).await.unwrap();

    assert_eq!(returned, digest);
    assert!(returned.starts_with("sha256:"));
    assert_eq!(mock.requests().await[0].body, contents);
}

#[tokio::test]
async fn test_create_blob_missing_file() {
    let mock = MockOllama::new().await;
    mock.expect_no_requests().await;

    let dir = tempfile::tempdir().unwrap();
    let err = mock
        .client()
        .create_blob(dir.path().join("absent.bin"))
        .await
        .unwrap_err();
    assert!(matches!(err, ollama_sdk::Error::Io(_)));
}

#[tokio::test]
async fn test_create_blob_server_error() {
    let mock = MockOllama::new().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "digest mismatch"})))
        .mount(&mock.server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"abc").unwrap();

    let err = mock.client().create_blob(file.path()).await.unwrap_err();
    assert_eq!(err.to_string(), "digest mismatch (status code: 400)");
}
