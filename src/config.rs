//! Configuration management for chatrelay
//!
//! This module handles loading, parsing, validating, and merging
//! configuration from the YAML config file and CLI overrides.

use crate::cli::{Cli, Commands};
use crate::error::{ChatRelayError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Main configuration structure for chatrelay
///
/// Holds the settings for both halves of the application: the chat client
/// and the streaming proxy. Every field has a default so an absent config
/// file yields a working local setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Chat client configuration
    #[serde(default)]
    pub client: ClientConfig,

    /// Proxy server configuration
    #[serde(default)]
    pub proxy: ProxyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            proxy: ProxyConfig::default(),
        }
    }
}

/// Chat client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Proxy chat endpoint the client posts conversations to
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8787/functions/v1/chat".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

/// Proxy server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Address the proxy listens on (host:port)
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Upstream completion API configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

fn default_listen() -> String {
    "127.0.0.1:8787".to_string()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            upstream: UpstreamConfig::default(),
        }
    }
}

/// Upstream completion API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the OpenAI-compatible API
    ///
    /// Pointing this at a mock server is the supported way to test the
    /// proxy without real credentials.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model requested from the upstream API
    #[serde(default = "default_model")]
    pub model: String,

    /// Explicit API key (useful for tests and local mocks)
    ///
    /// When unset, the key is read from the environment variable named by
    /// `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            api_key: None,
            api_key_env: default_api_key_env(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file and apply CLI overrides
    ///
    /// An absent file is not an error; defaults are used so the client and
    /// proxy work out of the box against localhost.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load(path: &str, cli: &Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            let contents = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&contents)?
        } else {
            tracing::debug!("Config file {} not found, using defaults", path);
            Self::default()
        };

        config.apply_cli_overrides(cli);
        Ok(config)
    }

    /// Apply command-specific CLI overrides onto the loaded configuration.
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Chat { endpoint } => {
                if let Some(endpoint) = endpoint {
                    self.client.endpoint = endpoint.clone();
                }
            }
            Commands::Serve { listen } => {
                if let Some(listen) = listen {
                    self.proxy.listen = listen.clone();
                }
            }
            Commands::Clear => {}
        }
    }

    /// Validate semantic constraints the type system cannot express
    ///
    /// # Errors
    ///
    /// Returns error if an endpoint is not a valid URL, the listen address
    /// is not a valid socket address, or the model name is empty.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.client.endpoint).map_err(|e| {
            ChatRelayError::Config(format!(
                "invalid client endpoint '{}': {}",
                self.client.endpoint, e
            ))
        })?;

        self.proxy.listen.parse::<SocketAddr>().map_err(|e| {
            ChatRelayError::Config(format!(
                "invalid proxy listen address '{}': {}",
                self.proxy.listen, e
            ))
        })?;

        url::Url::parse(&self.proxy.upstream.api_base).map_err(|e| {
            ChatRelayError::Config(format!(
                "invalid upstream api_base '{}': {}",
                self.proxy.upstream.api_base, e
            ))
        })?;

        if self.proxy.upstream.model.trim().is_empty() {
            return Err(ChatRelayError::Config("upstream model must not be empty".to_string()).into());
        }

        Ok(())
    }
}
