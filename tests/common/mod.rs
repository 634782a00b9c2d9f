//! Shared helpers for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chatrelay::message::Message;
use chatrelay::providers::{CompletionProvider, FragmentStream};
use chatrelay::server::build_router;
use std::sync::{Arc, Mutex};

/// Provider that replays a scripted sequence of fragment results and records
/// every conversation it receives.
pub struct ScriptedProvider {
    pub script: Vec<Result<String, String>>,
    pub seen: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl ScriptedProvider {
    /// Provider that emits the given fragments then ends normally.
    pub fn new(fragments: &[&str]) -> Self {
        Self {
            script: fragments.iter().map(|f| Ok(f.to_string())).collect(),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Provider that emits the given fragments then fails mid-stream.
    pub fn failing_after(fragments: &[&str], error: &str) -> Self {
        let mut script: Vec<Result<String, String>> =
            fragments.iter().map(|f| Ok(f.to_string())).collect();
        script.push(Err(error.to_string()));
        Self {
            script,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn stream_completion(&self, messages: &[Message]) -> chatrelay::Result<FragmentStream> {
        self.seen.lock().unwrap().push(messages.to_vec());

        let items: Vec<chatrelay::Result<String>> = self
            .script
            .iter()
            .cloned()
            .map(|r| r.map_err(|e| anyhow::anyhow!(e)))
            .collect();

        Ok(Box::pin(futures::stream::iter(items)))
    }
}

/// Provider whose stream_completion call itself fails.
pub struct FailingProvider;

#[async_trait]
impl CompletionProvider for FailingProvider {
    async fn stream_completion(&self, _messages: &[Message]) -> chatrelay::Result<FragmentStream> {
        Err(anyhow::anyhow!("upstream unreachable"))
    }
}

/// Serve the proxy router on an ephemeral port.
///
/// Returns the chat endpoint URL.
pub async fn spawn_proxy(provider: Arc<dyn CompletionProvider>) -> String {
    let app = build_router(provider);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/functions/v1/chat", addr)
}
