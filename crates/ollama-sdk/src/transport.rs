//! HTTP transport: header merging, context handling and status classification.

use crate::config::ClientConfig;
use crate::context::CallContext;
use crate::error::{Error, Result};
use crate::host::BaseUrl;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Body, Method, Response};
use tracing::{debug, warn};
use url::Url;

/// Sends requests to one server and classifies what comes back.
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    base_url: BaseUrl,
    headers: HeaderMap,
}

impl Transport {
    /// Build a transport from configuration, optionally reusing `http`.
    pub(crate) fn new(config: &ClientConfig, http: Option<reqwest::Client>) -> Result<Self> {
        let headers = default_headers(config)?;

        let http = match http {
            Some(http) => http,
            None => {
                let mut builder =
                    reqwest::Client::builder().connect_timeout(config.connect_timeout);
                if let Some(timeout) = config.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build().map_err(|e| {
                    Error::configuration(format!("Failed to create HTTP client: {e}"))
                })?
            }
        };

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            headers,
        })
    }

    pub(crate) fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Send one request.
    ///
    /// Responses with status 400 or above are drained and turned into
    /// [`Error::Response`]; anything else is handed back with its body unread.
    pub(crate) async fn send(
        &self,
        ctx: &CallContext,
        method: Method,
        path: &str,
        body: Option<Body>,
        extra_headers: Option<&HeaderMap>,
    ) -> Result<Response> {
        let raw = self.base_url.join(path);
        let url = Url::parse(&raw)
            .map_err(|e| Error::configuration(format!("Invalid request URL '{raw}': {e}")))?;

        let mut headers = self.headers.clone();
        if let Some(extra) = extra_headers {
            for (name, value) in extra {
                headers.insert(name.clone(), value.clone());
            }
        }

        debug!(%method, %url, "Sending request");

        let mut request = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = ctx
            .run(async move { request.send().await.map_err(Error::from) })
            .await
            .inspect_err(|e| debug!(error = %e, "Request failed"))?;

        let status = response.status();
        if status.as_u16() < 400 {
            debug!(status = status.as_u16(), "Received response");
            return Ok(response);
        }

        let text = ctx
            .run(async move { response.text().await.map_err(Error::from) })
            .await?;
        let err = Error::from_response_body(status.as_u16(), &text);
        warn!(status = status.as_u16(), error = %err, "Server returned an error");
        Err(err)
    }
}

/// Content type, accept and user agent, then the configured custom headers.
fn default_headers(config: &ClientConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&config.user_agent)
            .map_err(|e| Error::configuration(format!("Invalid user agent: {e}")))?,
    );

    for (name, value) in &config.custom_headers {
        let header_name = HeaderName::try_from(name.as_str())
            .map_err(|e| Error::configuration(format!("Invalid header name '{name}': {e}")))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            Error::configuration(format!("Invalid header value for '{name}': {e}"))
        })?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}
