//! HTTP transport between the chat client and the proxy

use crate::error::{ChatRelayError, Result};
use crate::message::Message;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::json;
use std::pin::Pin;
use std::time::Duration;

/// Raw SSE response body as a stream of byte chunks.
pub type ChatByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Transport seam between the conversation store and the proxy
///
/// The store depends on this trait rather than a concrete HTTP client, so
/// tests can script responses without a network.
#[async_trait]
pub trait ProxyTransport: Send + Sync {
    /// POST the conversation to the proxy chat endpoint
    ///
    /// On success returns the response body byte stream for the caller to
    /// drive through the stream assembler. A request failure or non-success
    /// status is a `Transport` error; there is a single attempt, no retry.
    async fn send_chat(&self, messages: &[Message]) -> Result<ChatByteStream>;
}

/// reqwest-backed transport used by the CLI client
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Create a transport for the given proxy chat endpoint URL
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be constructed.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ProxyTransport for HttpTransport {
    async fn send_chat(&self, messages: &[Message]) -> Result<ChatByteStream> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "messages": messages }))
            .send()
            .await
            .map_err(|e| ChatRelayError::Transport(format!("chat request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatRelayError::Transport(format!(
                "chat request returned HTTP {}: {}",
                status,
                body.trim()
            ))
            .into());
        }

        let stream = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| {
                anyhow::anyhow!(ChatRelayError::Transport(format!(
                    "stream read failed: {}",
                    e
                )))
            })
        });

        Ok(Box::pin(stream))
    }
}
