//! Generate, chat and embedding tests
//!
//! Single-shot and streamed responses, request body shape, tool calls.

use crate::fixtures::*;
use crate::helpers::*;
use crate::mock_ollama::*;
use futures::StreamExt;
use ollama_sdk::{
    ChatRequest, EmbedRequest, EmbeddingsRequest, GenerateRequest, Message, Options, Tool,
    ToolFunction,
};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_generate_single_response() {
    let mock = MockOllama::new().await;
    mock.mock_generate("The sky is blue because of Rayleigh scattering.")
        .await;

    let request = GenerateRequest::new(TEST_MODEL, "Why is the sky blue?")
        .options(Options::new().temperature(0.2).seed(42));
    let response = mock.client().generate(&request).await.unwrap();

    assert_eq!(
        response.response,
        "The sky is blue because of Rayleigh scattering."
    );
    assert!(response.metrics.is_done());
    assert_eq!(response.metrics.eval_count, Some(290));
    assert_eq!(response.context, vec![1, 2, 3]);

    let requests = mock.requests().await;
    assert_eq!(requests.len(), 1);
    assert_json_contains(
        &request_json(&requests[0]),
        &json!({
            "model": TEST_MODEL,
            "prompt": "Why is the sky blue?",
            "stream": false,
            "options": {"temperature": 0.2, "seed": 42}
        }),
    );
}

#[tokio::test]
async fn test_generate_stream_accumulates_fragments() {
    let mock = MockOllama::new().await;
    mock.mock_generate_stream(&["Hello", ", ", "world"]).await;

    let stream = mock
        .client()
        .generate_stream(&GenerateRequest::new(TEST_MODEL, "greet"))
        .await
        .unwrap();

    assert_eq!(stream.status(), 200);
    assert_eq!(stream.collect_content().await.unwrap(), "Hello, world");

    let body = request_json(&mock.requests().await[0]);
    assert_eq!(body["stream"], json!(true));
}

#[tokio::test]
async fn test_generate_stream_recv_until_done() {
    let mock = MockOllama::new().await;
    mock.mock_generate_stream(&["a", "b"]).await;

    let mut stream = mock
        .client()
        .generate_stream(&GenerateRequest::new(TEST_MODEL, "x"))
        .await
        .unwrap();

    let mut chunks = Vec::new();
    while let Some(chunk) = stream.recv().await.unwrap() {
        chunks.push(chunk);
    }
    stream.close();

    assert_eq!(chunks.len(), 3);
    assert!(!chunks[0].metrics.is_done());
    assert!(chunks[2].metrics.is_done());
    assert!(stream.recv().await.unwrap().is_none());
}

#[tokio::test]
async fn test_prompt_is_not_html_escaped() {
    let mock = MockOllama::new().await;
    mock.mock_generate("ok").await;

    mock.client()
        .generate(&GenerateRequest::new(TEST_MODEL, "<html> & </html>"))
        .await
        .unwrap();

    let raw = String::from_utf8(mock.requests().await[0].body.clone()).unwrap();
    assert!(raw.contains("<html> & </html>"), "{raw}");
}

#[tokio::test]
async fn test_chat_single_response() {
    let mock = MockOllama::new().await;
    mock.mock_chat("Paris").await;

    let request = ChatRequest::new(
        TEST_MODEL,
        vec![
            Message::system("Answer in one word."),
            Message::user("Capital of France?"),
        ],
    );
    let response = mock.client().chat(&request).await.unwrap();

    assert_eq!(response.message.content(), "Paris");
    assert_eq!(response.metrics.done_reason.as_deref(), Some("stop"));

    let body = request_json(&mock.requests().await[0]);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "Capital of France?");
    assert_eq!(body["stream"], json!(false));
}

#[tokio::test]
async fn test_chat_stream_as_futures_stream() {
    let mock = MockOllama::new().await;
    mock.mock_chat_stream(&["po", "ng"]).await;

    let request = ChatRequest::new(TEST_MODEL, vec![Message::user("ping")]);
    let stream = mock.client().chat_stream(&request).await.unwrap();

    let content: String = stream
        .into_stream()
        .map(|chunk| chunk.unwrap().message.content().to_string())
        .collect::<Vec<_>>()
        .await
        .concat();
    assert_eq!(content, "pong");
}

#[tokio::test]
async fn test_chat_tool_call() {
    let mock = MockOllama::new().await;
    mock.mock_json(
        "POST",
        "/api/chat",
        200,
        tool_call_response(TEST_MODEL, "get_weather", json!({"city": "Toronto"})),
    )
    .await;

    let tool = Tool::function(ToolFunction {
        name: Some("get_weather".to_string()),
        description: Some("Current weather for a city".to_string()),
        parameters: None,
    });
    let request =
        ChatRequest::new(TEST_MODEL, vec![Message::user("Weather in Toronto?")]).tool(tool);
    let response = mock.client().chat(&request).await.unwrap();

    let calls = &response.message.tool_calls;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].function.name, "get_weather");
    assert_eq!(calls[0].function.arguments["city"], "Toronto");

    let body = request_json(&mock.requests().await[0]);
    assert_eq!(body["tools"][0]["type"], "function");
}

#[tokio::test]
async fn test_embed_batch() {
    let mock = MockOllama::new().await;
    mock.mock_json(
        "POST",
        "/api/embed",
        200,
        json!({"model": "nomic-embed-text", "embeddings": [[0.1, 0.2], [0.3, 0.4]]}),
    )
    .await;

    let request = EmbedRequest::new(
        "nomic-embed-text",
        vec!["first".to_string(), "second".to_string()],
    );
    let response = mock.client().embed(&request).await.unwrap();

    assert_eq!(response.embeddings, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    let body = request_json(&mock.requests().await[0]);
    assert_eq!(body["input"], json!(["first", "second"]));
}

#[tokio::test]
async fn test_embeddings_deprecated_endpoint() {
    let mock = MockOllama::new().await;
    mock.mock_json(
        "POST",
        "/api/embeddings",
        200,
        json!({"embedding": [0.5, -0.5]}),
    )
    .await;

    let request = EmbeddingsRequest {
        model: "nomic-embed-text".to_string(),
        prompt: Some("hello".to_string()),
        ..Default::default()
    };
    let response = mock.client().embeddings(&request).await.unwrap();
    assert_eq!(response.embedding, vec![0.5, -0.5]);
}
