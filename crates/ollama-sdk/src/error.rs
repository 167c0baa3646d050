//! Error types for the Ollama SDK.

use std::io::ErrorKind;
use thiserror::Error;

/// Result type for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message carried by every [`Error::Connection`].
pub const CONNECTION_ERROR_MESSAGE: &str = "Failed to connect to Ollama. Please check that Ollama is downloaded, running and accessible. https://ollama.com/download";

/// Errors that can occur when using the Ollama SDK.
#[derive(Error, Debug)]
pub enum Error {
    /// A local precondition failed before any I/O happened.
    #[error("{message}")]
    Request {
        /// What was wrong with the request.
        message: String,
    },

    /// The server could not be reached.
    #[error("{message}")]
    Connection {
        /// Remediation hint.
        message: String,
    },

    /// The server answered with an HTTP error or reported an error in-band.
    #[error("{}", response_display(.message, .status_code))]
    Response {
        /// Server-supplied error text, or the raw body.
        message: String,
        /// HTTP status, when known.
        status_code: Option<u16>,
    },

    /// A response body or stream line was not the expected JSON.
    #[error("Failed to decode response: {message}")]
    Decode {
        /// Decoder error text.
        message: String,
    },

    /// A request body could not be serialized to JSON.
    #[error("Failed to encode request: {message}")]
    Encode {
        /// Encoder error text.
        message: String,
    },

    /// The caller cancelled the call.
    #[error("Request cancelled")]
    Cancelled,

    /// The caller's deadline passed before the call finished.
    #[error("Deadline exceeded after {duration_ms}ms")]
    DeadlineExceeded {
        /// Configured deadline in milliseconds.
        duration_ms: u64,
    },

    /// Invalid client configuration (header, URL).
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// Local file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport failure that is not a connection failure.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
}

#[allow(clippy::ref_option)]
fn response_display(message: &str, status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => format!("{message} (status code: {code})"),
        None => message.to_string(),
    }
}

impl Error {
    /// Create a request error.
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// The connection error with its fixed remediation message.
    pub fn connection() -> Self {
        Self::Connection {
            message: CONNECTION_ERROR_MESSAGE.to_string(),
        }
    }

    /// Create a response error.
    pub fn response(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self::Response {
            message: message.into(),
            status_code,
        }
    }

    /// Build a response error from an HTTP error body.
    ///
    /// A JSON body with a non-empty string `error` field contributes that
    /// field; anything else is reported verbatim.
    pub fn from_response_body(status_code: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| in_band_error(&value).map(str::to_string))
            .unwrap_or_else(|| body.to_string());
        Self::response(message, Some(status_code))
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an encode error.
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Create a deadline error.
    pub fn deadline_exceeded(duration_ms: u64) -> Self {
        Self::DeadlineExceeded { duration_ms }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this is a local validation failure.
    pub fn is_request_error(&self) -> bool {
        matches!(self, Self::Request { .. })
    }

    /// Whether the server could not be reached.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Whether the server reported an error.
    pub fn is_response_error(&self) -> bool {
        matches!(self, Self::Response { .. })
    }

    /// Whether the caller cancelled the call or its deadline passed.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded { .. })
    }

    /// Get the HTTP status code if available.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response { status_code, .. } => *status_code,
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if is_connection_failure(&err) {
            Self::connection()
        } else {
            Self::Http(err)
        }
    }
}

/// Whether a transport failure means the server is not reachable.
///
/// Looks for a refused or unreachable `io::Error` anywhere in the source
/// chain, then falls back to matching "connection refused" in the text of
/// each cause. DNS failures are not connection failures.
pub fn is_connection_failure(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(cause) = current {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                ErrorKind::ConnectionRefused
                    | ErrorKind::NetworkUnreachable
                    | ErrorKind::HostUnreachable
            ) {
                return true;
            }
        }
        if cause
            .to_string()
            .to_ascii_lowercase()
            .contains("connection refused")
        {
            return true;
        }
        current = cause.source();
    }
    false
}

/// The non-empty string `error` field of a JSON object, if any.
pub(crate) fn in_band_error(value: &serde_json::Value) -> Option<&str> {
    value
        .get("error")
        .and_then(serde_json::Value::as_str)
        .filter(|message| !message.is_empty())
}
