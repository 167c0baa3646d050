//! Streaming support for the Ollama SDK.
//!
//! Streamed endpoints answer with newline-delimited JSON: one object per
//! line, terminated by the server closing the connection. [`NdjsonStream`]
//! decodes those lines one at a time into a typed value. A line carrying an
//! `"error"` field is reported as [`Error::Response`] even though the HTTP
//! status was a success.

use crate::context::CallContext;
use crate::error::{in_band_error, Error, Result};
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use ollama_core::{ChatResponse, GenerateResponse};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::pin::Pin;
use tracing::debug;

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// A handle on a streamed response.
///
/// Reading needs `&mut self`, so one handle has exactly one consumer.
pub struct NdjsonStream<T> {
    body: Option<ByteStream>,
    buffer: Vec<u8>,
    status: u16,
    ctx: CallContext,
    closed: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for NdjsonStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NdjsonStream")
            .field("status", &self.status)
            .field("buffered", &self.buffer.len())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl<T: DeserializeOwned> NdjsonStream<T> {
    /// Wrap a response whose status has already been checked.
    pub(crate) fn from_response(response: reqwest::Response, ctx: CallContext) -> Self {
        let status = response.status().as_u16();
        let body = response.bytes_stream().map(|chunk| chunk.map_err(Error::from));
        Self::from_stream(body, status, ctx)
    }

    /// Decode lines from any byte stream.
    pub fn from_stream<S>(body: S, status: u16, ctx: CallContext) -> Self
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        Self {
            body: Some(Box::pin(body)),
            buffer: Vec::new(),
            status,
            ctx,
            closed: false,
            _marker: PhantomData,
        }
    }

    /// HTTP status of the response that opened the stream.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the stream has ended or been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Receive the next value. `Ok(None)` means the stream has ended.
    ///
    /// A line that fails to decode fails this receive only; the next call
    /// continues with the following line. An in-band error closes the
    /// stream, so every later call returns `Ok(None)`.
    pub async fn recv(&mut self) -> Result<Option<T>> {
        loop {
            if let Some(line) = self.next_line() {
                match self.decode_line(&line) {
                    Ok(Some(value)) => return Ok(Some(value)),
                    Ok(None) => continue,
                    Err(e) => return Err(self.fail_line(e)),
                }
            }

            let Some(body) = self.body.as_mut() else {
                return Ok(None);
            };

            let chunk = self.ctx.run(async { Ok(body.next().await) }).await?;
            match chunk {
                Some(Ok(bytes)) => self.buffer.extend_from_slice(&bytes),
                Some(Err(e)) => {
                    debug!(error = %e, "Stream read failed");
                    return Err(e);
                }
                None => {
                    let rest = std::mem::take(&mut self.buffer);
                    self.close();
                    return self.decode_line(&rest).map_err(|e| self.fail_line(e));
                }
            }
        }
    }

    /// Release the response body. Safe to call any number of times.
    pub fn close(&mut self) {
        if !self.closed {
            debug!(status = self.status, "Closing stream");
        }
        self.body = None;
        self.buffer.clear();
        self.closed = true;
    }

    /// Drain the stream into a vector, closing it on every exit path.
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut values = Vec::new();
        loop {
            match self.recv().await {
                Ok(Some(value)) => values.push(value),
                Ok(None) => break,
                Err(e) => {
                    self.close();
                    return Err(e);
                }
            }
        }
        self.close();
        Ok(values)
    }

    /// Adapt into a [`Stream`] that ends after the last value or the first
    /// error.
    pub fn into_stream(mut self) -> impl Stream<Item = Result<T>> + Send
    where
        T: Send + 'static,
    {
        async_stream::stream! {
            loop {
                match self.recv().await {
                    Ok(Some(value)) => yield Ok(value),
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
            self.close();
        }
    }

    fn next_line(&mut self) -> Option<Vec<u8>> {
        let end = self.buffer.iter().position(|&b| b == b'\n')?;
        Some(self.buffer.drain(..=end).collect())
    }

    /// In-band errors end the stream; decode errors skip the line.
    fn fail_line(&mut self, err: Error) -> Error {
        if err.is_response_error() {
            debug!(error = %err, "Stream ended by in-band error");
            self.close();
        }
        err
    }

    /// `Ok(None)` for a blank line.
    fn decode_line(&self, line: &[u8]) -> Result<Option<T>> {
        let line = line.trim_ascii();
        if line.is_empty() {
            return Ok(None);
        }

        let value: Value =
            serde_json::from_slice(line).map_err(|e| Error::decode(e.to_string()))?;
        if let Some(message) = in_band_error(&value) {
            return Err(Error::response(message, Some(self.status)));
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| Error::decode(e.to_string()))
    }
}

impl NdjsonStream<GenerateResponse> {
    /// Concatenate the generated text of every chunk.
    pub async fn collect_content(self) -> Result<String> {
        let chunks = self.collect_all().await?;
        Ok(chunks.iter().map(|chunk| chunk.response.as_str()).collect())
    }
}

impl NdjsonStream<ChatResponse> {
    /// Concatenate the message content of every chunk.
    pub async fn collect_content(self) -> Result<String> {
        let chunks = self.collect_all().await?;
        Ok(chunks.iter().map(|chunk| chunk.message.content()).collect())
    }
}
