//! Single-shot JSON request/response exchange.

use crate::context::CallContext;
use crate::error::{Error, Result};
use crate::transport::Transport;
use ollama_core::ModelRequest;
use reqwest::{Body, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;

impl Transport {
    /// Send `body` as JSON and decode exactly one JSON document back.
    pub(crate) async fn request_json<Req, Res>(
        &self,
        ctx: &CallContext,
        method: Method,
        path: &str,
        body: Option<&Req>,
    ) -> Result<Res>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let body = body.map(encode_body).transpose()?;
        let response = self
            .send(ctx, method, path, body.map(Body::from), None)
            .await?;
        let bytes = ctx
            .run(async move { response.bytes().await.map_err(Error::from) })
            .await?;
        decode_single(&bytes)
    }
}

pub(crate) fn encode_body<T: Serialize + ?Sized>(body: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(body).map_err(|e| Error::encode(e.to_string()))
}

/// Decode the first JSON document in `bytes`; anything after it is ignored.
pub(crate) fn decode_single<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    match serde_json::Deserializer::from_slice(bytes)
        .into_iter::<T>()
        .next()
    {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => Err(Error::decode(e.to_string())),
        None => Err(Error::decode("empty response body")),
    }
}

/// Reject requests with an empty model before any I/O.
pub(crate) fn require_model<R: ModelRequest + ?Sized>(request: &R) -> Result<()> {
    if request.model().is_empty() {
        return Err(Error::request("model is required"));
    }
    Ok(())
}
