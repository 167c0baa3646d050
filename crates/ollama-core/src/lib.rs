//! # Ollama Core
//!
//! Data contracts for the Ollama REST API.
//!
//! This crate provides the typed payloads exchanged with an Ollama server:
//! - Request types for every endpoint (generate, chat, embed, model management)
//! - Response types, including the per-line chunks of streamed responses
//! - Model runtime options
//! - Image inputs and tool declarations
//!
//! It performs no I/O beyond reading image files handed to [`Image::from_path`];
//! transport lives in `ollama-sdk`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod image;
pub mod options;
pub mod request;
pub mod response;
pub mod tool;

// Re-export commonly used types
pub use image::{Image, ImageError};
pub use options::Options;
pub use request::{
    ChatRequest, CopyRequest, CreateRequest, DeleteRequest, EmbedInput, EmbedRequest,
    EmbeddingsRequest, GenerateRequest, KeepAlive, Message, ModelRequest, PullRequest,
    PushRequest, ShowRequest, StreamableRequest, Think,
};
pub use response::{
    ChatResponse, EmbedResponse, EmbeddingsResponse, GenerateMetrics, GenerateResponse,
    ListModel, ListResponse, ModelDetails, ProcessModel, ProcessResponse, ProgressResponse,
    ShowResponse, StatusResponse, VersionResponse,
};
pub use tool::{Tool, ToolCall, ToolCallFunction, ToolFunction, ToolParameters};
