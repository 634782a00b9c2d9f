//! Streaming proxy server
//!
//! A single-endpoint HTTP proxy between the chat client and the upstream
//! completion provider. The provider is a trait object so tests can run the
//! full server against scripted completions.

pub mod routes;

pub use routes::build_router;

use crate::config::ProxyConfig;
use crate::error::Result;
use crate::providers::CompletionProvider;
use std::sync::Arc;

/// Single-endpoint streaming proxy
pub struct ProxyServer {
    config: ProxyConfig,
    provider: Arc<dyn CompletionProvider>,
}

impl ProxyServer {
    /// Create a proxy server from configuration and a provider
    pub fn new(config: ProxyConfig, provider: Arc<dyn CompletionProvider>) -> Self {
        Self { config, provider }
    }

    /// Build the router with the chat route
    pub fn build_router(&self) -> axum::Router {
        routes::build_router(Arc::clone(&self.provider))
    }

    /// Bind the configured address and serve until interrupted
    ///
    /// # Errors
    ///
    /// Returns error if the listen address cannot be bound or the server
    /// fails while running.
    pub async fn run(&self) -> Result<()> {
        let app = self.build_router();

        let listener = tokio::net::TcpListener::bind(&self.config.listen).await?;
        tracing::info!("Proxy listening on {}", self.config.listen);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Proxy shutting down");
            })
            .await?;

        Ok(())
    }
}
