//! Client configuration for the Ollama SDK.

use crate::host::{BaseUrl, DEFAULT_HOST};
use std::time::Duration;

/// Configuration for the Ollama client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Canonical base URL of the server.
    pub(crate) base_url: BaseUrl,
    /// Overall request timeout; `None` waits for as long as generation takes.
    pub(crate) timeout: Option<Duration>,
    /// Connection timeout duration.
    pub(crate) connect_timeout: Duration,
    /// User agent string.
    pub(crate) user_agent: String,
    /// Custom headers to include in requests. These override the defaults.
    pub(crate) custom_headers: Vec<(String, String)>,
}

impl ClientConfig {
    /// Environment variable consulted when no host is given.
    pub const HOST_ENV: &'static str = "OLLAMA_HOST";
    /// Default connection timeout (10 seconds).
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a new configuration with default values.
    pub fn new(base_url: BaseUrl) -> Self {
        Self {
            base_url,
            timeout: None,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            user_agent: default_user_agent(),
            custom_headers: Vec::new(),
        }
    }

    /// Configuration for the host in `OLLAMA_HOST`, or the default host.
    pub fn from_env() -> Self {
        let env = std::env::var(Self::HOST_ENV).ok();
        Self::new(resolve_host(None, env.as_deref()))
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Get the connection timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Get the user agent.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Get custom headers.
    pub fn custom_headers(&self) -> &[(String, String)] {
        &self.custom_headers
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(BaseUrl::default())
    }
}

/// `ollama-rust/<version> (<arch> <os>) Rust`
pub fn default_user_agent() -> String {
    format!(
        "ollama-rust/{} ({} {}) Rust",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::ARCH,
        std::env::consts::OS
    )
}

/// Pick the server address: explicit host, then the environment, then the
/// default. Blank values are skipped.
pub fn resolve_host(explicit: Option<&str>, env: Option<&str>) -> BaseUrl {
    explicit
        .and_then(BaseUrl::parse)
        .or_else(|| env.and_then(BaseUrl::parse))
        .or_else(|| BaseUrl::parse(DEFAULT_HOST))
        .unwrap_or_default()
}
