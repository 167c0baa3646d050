//! HTTP client for the Ollama SDK.

use crate::blob::open_hashed;
use crate::config::{default_user_agent, resolve_host, ClientConfig};
use crate::context::CallContext;
use crate::error::{Error, Result};
use crate::exchange::{encode_body, require_model};
use crate::host::BaseUrl;
use crate::streaming::NdjsonStream;
use crate::transport::Transport;
use ollama_core::{
    ChatRequest, ChatResponse, CopyRequest, CreateRequest, DeleteRequest, EmbedRequest,
    EmbedResponse, EmbeddingsRequest, EmbeddingsResponse, GenerateRequest, GenerateResponse,
    ListResponse, ProcessResponse, ProgressResponse, PullRequest, PushRequest, ShowRequest,
    ShowResponse, StatusResponse, StreamableRequest, VersionResponse,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Body, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Client for an Ollama server.
///
/// Cloning is cheap; clones share the connection pool.
///
/// # Example
///
/// ```rust,no_run
/// use ollama_sdk::{Client, GenerateRequest};
///
/// #[tokio::main]
/// async fn main() -> Result<(), ollama_sdk::Error> {
///     let client = Client::builder().host("localhost").build()?;
///
///     let response = client
///         .generate(&GenerateRequest::new("llama3.2", "Why is the sky blue?"))
///         .await?;
///
///     println!("{}", response.response);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    transport: Arc<Transport>,
    config: Arc<ClientConfig>,
    stream_headers: Arc<HeaderMap>,
    ctx: CallContext,
}

impl Client {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_http_client(config, None)
    }

    /// Create a client for the host in `OLLAMA_HOST`, or the default host.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    fn with_http_client(config: ClientConfig, http: Option<reqwest::Client>) -> Result<Self> {
        let transport = Transport::new(&config, http)?;

        let mut stream_headers = HeaderMap::new();
        let accept_configured = config
            .custom_headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(ACCEPT.as_str()));
        if !accept_configured {
            stream_headers.insert(ACCEPT, HeaderValue::from_static("application/x-ndjson"));
        }

        debug!(base_url = %config.base_url, "Created Ollama client");

        Ok(Self {
            transport: Arc::new(transport),
            config: Arc::new(config),
            stream_headers: Arc::new(stream_headers),
            ctx: CallContext::background(),
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Canonical base URL every request goes to.
    pub fn base_url(&self) -> &BaseUrl {
        self.transport.base_url()
    }

    /// A clone of this client whose calls observe `ctx`.
    ///
    /// ```rust,no_run
    /// # use ollama_sdk::{CallContext, Client};
    /// # use std::time::Duration;
    /// # async fn example(client: &Client) -> Result<(), ollama_sdk::Error> {
    /// let ctx = CallContext::background().with_timeout(Duration::from_secs(5));
    /// let models = client.with_context(ctx).list().await?;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn with_context(&self, ctx: CallContext) -> Self {
        Self {
            ctx,
            ..self.clone()
        }
    }

    /// Generate a completion and wait for the full response.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        self.single("/api/generate", request).await
    }

    /// Generate a completion as a stream of chunks.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn generate_stream(
        &self,
        request: &GenerateRequest,
    ) -> Result<NdjsonStream<GenerateResponse>> {
        self.open_stream("/api/generate", request).await
    }

    /// Send a chat turn and wait for the full response.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.single("/api/chat", request).await
    }

    /// Send a chat turn and stream the reply.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn chat_stream(&self, request: &ChatRequest) -> Result<NdjsonStream<ChatResponse>> {
        self.open_stream("/api/chat", request).await
    }

    /// Embed one or more inputs.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn embed(&self, request: &EmbedRequest) -> Result<EmbedResponse> {
        require_model(request)?;
        self.post_json("/api/embed", request).await
    }

    /// Embed a single prompt with the deprecated endpoint.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn embeddings(&self, request: &EmbeddingsRequest) -> Result<EmbeddingsResponse> {
        require_model(request)?;
        self.post_json("/api/embeddings", request).await
    }

    /// Pull a model and wait for completion.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn pull(&self, request: &PullRequest) -> Result<ProgressResponse> {
        self.single("/api/pull", request).await
    }

    /// Pull a model, streaming progress.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn pull_stream(
        &self,
        request: &PullRequest,
    ) -> Result<NdjsonStream<ProgressResponse>> {
        self.open_stream("/api/pull", request).await
    }

    /// Push a model and wait for completion.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn push(&self, request: &PushRequest) -> Result<ProgressResponse> {
        self.single("/api/push", request).await
    }

    /// Push a model, streaming progress.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn push_stream(
        &self,
        request: &PushRequest,
    ) -> Result<NdjsonStream<ProgressResponse>> {
        self.open_stream("/api/push", request).await
    }

    /// Create a model and wait for completion.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn create(&self, request: &CreateRequest) -> Result<ProgressResponse> {
        self.single("/api/create", request).await
    }

    /// Create a model, streaming progress.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn create_stream(
        &self,
        request: &CreateRequest,
    ) -> Result<NdjsonStream<ProgressResponse>> {
        self.open_stream("/api/create", request).await
    }

    /// List installed models.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<ListResponse> {
        self.get_json("/api/tags").await
    }

    /// Show model details.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn show(&self, request: &ShowRequest) -> Result<ShowResponse> {
        require_model(request)?;
        self.post_json("/api/show", request).await
    }

    /// List models loaded in memory.
    #[instrument(skip(self))]
    pub async fn ps(&self) -> Result<ProcessResponse> {
        self.get_json("/api/ps").await
    }

    /// Delete a model.
    ///
    /// Status 200 maps to `"success"`; any other status, including an HTTP
    /// error, maps to `"error"`. Transport failures are still returned.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn delete(&self, request: &DeleteRequest) -> Result<StatusResponse> {
        self.status_call(Method::DELETE, "/api/delete", request).await
    }

    /// Copy a model. Status mapping as for [`delete`](Self::delete).
    #[instrument(skip(self, request), fields(source = %request.source, destination = %request.destination))]
    pub async fn copy(&self, request: &CopyRequest) -> Result<StatusResponse> {
        self.status_call(Method::POST, "/api/copy", request).await
    }

    /// Upload a file as a blob and return its `sha256:<hex>` digest.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn create_blob(&self, path: impl AsRef<Path>) -> Result<String> {
        let (file, digest) = self.ctx.run(open_hashed(path.as_ref())).await?;

        debug!(%digest, "Uploading blob");

        let endpoint = format!("/api/blobs/{digest}");
        self.transport
            .send(&self.ctx, Method::POST, &endpoint, Some(Body::from(file)), None)
            .await?;
        Ok(digest)
    }

    /// Server version.
    #[instrument(skip(self))]
    pub async fn version(&self) -> Result<VersionResponse> {
        self.get_json("/api/version").await
    }

    async fn get_json<Res: DeserializeOwned>(&self, path: &str) -> Result<Res> {
        self.transport
            .request_json::<(), Res>(&self.ctx, Method::GET, path, None)
            .await
    }

    async fn post_json<Req, Res>(&self, path: &str, request: &Req) -> Result<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        self.transport
            .request_json(&self.ctx, Method::POST, path, Some(request))
            .await
    }

    /// Non-streaming call on a streamable endpoint.
    async fn single<Req, Res>(&self, path: &str, request: &Req) -> Result<Res>
    where
        Req: StreamableRequest + Serialize + Clone,
        Res: DeserializeOwned,
    {
        require_model(request)?;
        let mut request = request.clone();
        request.set_stream(false);
        self.post_json(path, &request).await
    }

    async fn open_stream<Req, Res>(&self, path: &str, request: &Req) -> Result<NdjsonStream<Res>>
    where
        Req: StreamableRequest + Serialize + Clone,
        Res: DeserializeOwned,
    {
        require_model(request)?;
        let mut request = request.clone();
        request.set_stream(true);
        let body = encode_body(&request)?;

        let response = self
            .transport
            .send(
                &self.ctx,
                Method::POST,
                path,
                Some(Body::from(body)),
                Some(&self.stream_headers),
            )
            .await?;

        debug!(status = response.status().as_u16(), "Stream opened");
        Ok(NdjsonStream::from_response(response, self.ctx.clone()))
    }

    async fn status_call<Req: Serialize>(
        &self,
        method: Method,
        path: &str,
        request: &Req,
    ) -> Result<StatusResponse> {
        let body = encode_body(request)?;
        match self
            .transport
            .send(&self.ctx, method, path, Some(Body::from(body)), None)
            .await
        {
            Ok(response) if response.status().as_u16() == 200 => Ok(StatusResponse::success()),
            Ok(_) | Err(Error::Response { .. }) => Ok(StatusResponse::error()),
            Err(e) => Err(e),
        }
    }
}

/// Builder for creating a Client.
#[derive(Debug, Default)]
pub struct ClientBuilder {
    host: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    custom_headers: Vec<(String, String)>,
    http_client: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Create a new client builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server address. Loose forms such as `localhost:11434` or
    /// `example.com/ollama` are normalized.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the overall request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Add a header to every request. Overrides a default header of the
    /// same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Use an existing `reqwest` client. Its own timeouts apply instead of
    /// the ones set here.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client> {
        let env = std::env::var(ClientConfig::HOST_ENV).ok();
        let base_url = resolve_host(self.host.as_deref(), env.as_deref());

        let config = ClientConfig {
            base_url,
            timeout: self.timeout,
            connect_timeout: self
                .connect_timeout
                .unwrap_or(ClientConfig::DEFAULT_CONNECT_TIMEOUT),
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
            custom_headers: self.custom_headers,
        };

        Client::with_http_client(config, self.http_client)
    }
}
