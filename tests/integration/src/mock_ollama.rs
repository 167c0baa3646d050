//! Mock Ollama server for integration testing
//!
//! Wraps a wiremock server with helpers that mount the endpoints the client
//! talks to.

use crate::fixtures::*;
use crate::helpers::client_for;
use ollama_sdk::Client;
use serde_json::Value;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Mock Ollama API server
pub struct MockOllama {
    pub server: MockServer,
}

impl MockOllama {
    /// Start a new mock server
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// A client pointed at this server
    pub fn client(&self) -> Client {
        client_for(&self.url())
    }

    /// Requests received so far
    pub async fn requests(&self) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .expect("Request recording is disabled")
    }

    /// Respond to `verb path` with a JSON body
    pub async fn mock_json(&self, verb: &str, endpoint: &str, status: u16, body: Value) {
        Mock::given(method(verb))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Respond to `POST path` with an NDJSON body
    pub async fn mock_ndjson(&self, endpoint: &str, lines: &[Value]) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(ndjson(lines), "application/x-ndjson"),
            )
            .mount(&self.server)
            .await;
    }

    /// Respond to `verb path` with a bare status and raw text body
    pub async fn mock_status(&self, verb: &str, endpoint: &str, status: u16, body: &str) {
        Mock::given(method(verb))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Setup a successful generate response
    pub async fn mock_generate(&self, text: &str) {
        self.mock_json("POST", "/api/generate", 200, generate_response(TEST_MODEL, text))
            .await;
    }

    /// Setup a streamed generate response, one chunk per fragment
    pub async fn mock_generate_stream(&self, fragments: &[&str]) {
        let mut lines: Vec<Value> = fragments
            .iter()
            .map(|fragment| generate_chunk(TEST_MODEL, fragment, false))
            .collect();
        lines.push(generate_chunk(TEST_MODEL, "", true));
        self.mock_ndjson("/api/generate", &lines).await;
    }

    /// Setup a successful chat response
    pub async fn mock_chat(&self, content: &str) {
        self.mock_json("POST", "/api/chat", 200, chat_response(TEST_MODEL, content))
            .await;
    }

    /// Setup a streamed chat response, one chunk per fragment
    pub async fn mock_chat_stream(&self, fragments: &[&str]) {
        let mut lines: Vec<Value> = fragments
            .iter()
            .map(|fragment| chat_chunk(TEST_MODEL, fragment, false))
            .collect();
        lines.push(chat_chunk(TEST_MODEL, "", true));
        self.mock_ndjson("/api/chat", &lines).await;
    }

    /// Setup a chat response that arrives after `delay`
    pub async fn mock_chat_delayed(&self, content: &str, delay: Duration) {
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_response(TEST_MODEL, content))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Fail every request with a server error, and expect none to arrive
    pub async fn expect_no_requests(&self) {
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }
}
