//! # Ollama SDK
//!
//! An async Rust client for the Ollama REST API.
//!
//! ## Features
//!
//! - Async-first design with full `tokio` support
//! - Streaming responses decoded line by line from NDJSON
//! - Loose host strings normalized to a canonical base URL
//! - Per-call cancellation and deadlines through [`CallContext`]
//! - Errors split into request, connection and response failures
//! - Content-addressed blob upload
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ollama_sdk::{ChatRequest, Client, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ollama_sdk::Error> {
//!     let client = Client::builder().host("http://localhost:11434").build()?;
//!
//!     let request = ChatRequest::new("llama3.2", vec![Message::user("Hello, world!")]);
//!     let response = client.chat(&request).await?;
//!
//!     println!("Response: {}", response.message.content());
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming
//!
//! ```rust,no_run
//! use ollama_sdk::{Client, GenerateRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ollama_sdk::Error> {
//!     let client = Client::from_env()?;
//!
//!     let mut stream = client
//!         .generate_stream(&GenerateRequest::new("llama3.2", "Tell me a story"))
//!         .await?;
//!
//!     while let Some(chunk) = stream.recv().await? {
//!         print!("{}", chunk.response);
//!     }
//!     stream.close();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod blob;
mod client;
mod config;
mod context;
mod error;
mod exchange;
pub mod host;
mod streaming;
mod transport;

pub use blob::{digest_bytes, file_digest};
pub use client::{Client, ClientBuilder};
pub use config::{default_user_agent, resolve_host, ClientConfig};
pub use context::{CallContext, CancelHandle, CancelSignal};
pub use error::{is_connection_failure, Error, Result, CONNECTION_ERROR_MESSAGE};
pub use host::{normalize_host, BaseUrl};
pub use streaming::NdjsonStream;

// Re-export core types for convenience
pub use ollama_core::{
    ChatRequest, ChatResponse, CopyRequest, CreateRequest, DeleteRequest, EmbedInput,
    EmbedRequest, EmbedResponse, EmbeddingsRequest, EmbeddingsResponse, GenerateMetrics,
    GenerateRequest, GenerateResponse, Image, ImageError, KeepAlive, ListModel, ListResponse,
    Message, ModelDetails, ModelRequest, Options, ProcessModel, ProcessResponse,
    ProgressResponse, PullRequest, PushRequest, ShowRequest, ShowResponse, StatusResponse,
    StreamableRequest, Think, Tool, ToolCall, ToolCallFunction, ToolFunction, ToolParameters,
    VersionResponse,
};
