//! OpenAI-compatible chat-completions client with streamed responses

use crate::config::UpstreamConfig;
use crate::error::{ChatRelayError, Result};
use crate::message::Message;
use crate::providers::{CompletionProvider, FragmentStream};
use crate::sse::{SseFrameDecoder, DONE_SENTINEL};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Streamed chat-completion chunk (only the fields the proxy consumes).
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible completion provider
#[derive(Debug)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl OpenAiProvider {
    /// Create a provider from upstream configuration
    ///
    /// The API key is taken from the explicit `api_key` setting when present
    /// (useful for tests and local mocks), otherwise from the environment
    /// variable named by `api_key_env`.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` if no key can be resolved.
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let api_key = match config.api_key {
            Some(key) => key,
            None => std::env::var(&config.api_key_env)
                .map_err(|_| ChatRelayError::MissingCredentials(config.api_key_env.clone()))?,
        };

        Ok(Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model,
            api_key,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn stream_completion(&self, messages: &[Message]) -> Result<FragmentStream> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": messages,
                "stream": true,
            }))
            .send()
            .await
            .map_err(|e| ChatRelayError::Provider(format!("completion request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatRelayError::Provider(format!(
                "completion request returned HTTP {}: {}",
                status,
                body.trim()
            ))
            .into());
        }

        let byte_stream = response.bytes_stream();
        let (tx, rx) = mpsc::unbounded_channel();

        // Parse the upstream SSE body in a background task and forward
        // content deltas through the channel.
        tokio::spawn(async move {
            let mut decoder = SseFrameDecoder::new();
            tokio::pin!(byte_stream);

            while let Some(chunk) = byte_stream.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.send(Err(anyhow::anyhow!(ChatRelayError::Provider(
                            format!("upstream stream failed: {}", e)
                        ))));
                        return;
                    }
                };

                for payload in decoder.feed(&chunk) {
                    match decode_delta(&payload) {
                        Delta::Content(content) => {
                            if tx.send(Ok(content)).is_err() {
                                // Consumer dropped the stream; stop forwarding.
                                return;
                            }
                        }
                        Delta::Finished => return,
                        Delta::Skip => {}
                    }
                }
            }
        });

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}

/// Outcome of decoding one upstream SSE payload.
enum Delta {
    Content(String),
    Finished,
    Skip,
}

/// Decode one upstream SSE payload into a content delta
///
/// `[DONE]` and unparsable chunks are skipped; a chunk carrying a
/// `finish_reason` and no content ends emission.
fn decode_delta(payload: &str) -> Delta {
    if payload == DONE_SENTINEL {
        return Delta::Skip;
    }

    let chunk: StreamChunk = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::warn!("Skipping malformed upstream chunk: {}", e);
            return Delta::Skip;
        }
    };

    let Some(choice) = chunk.choices.into_iter().next() else {
        return Delta::Skip;
    };

    if let Some(content) = choice.delta.content {
        if !content.is_empty() {
            return Delta::Content(content);
        }
    }

    if choice.finish_reason.is_some() {
        return Delta::Finished;
    }

    Delta::Skip
}
