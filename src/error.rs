//! Error types for chatrelay
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for chatrelay operations
///
/// This enum encompasses all possible errors that can occur while loading
/// configuration, talking to the proxy, calling the upstream provider, and
/// persisting the conversation.
#[derive(Error, Debug)]
pub enum ChatRelayError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Client-to-proxy transport errors (request construction, network
    /// failures, non-success status, stream reads)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Upstream provider errors (completion API calls on the proxy side)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Conversation storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Missing credentials for the upstream provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// A send was attempted while another send holds the in-flight slot
    #[error("A chat request is already in flight")]
    RequestInFlight,

    /// Empty or whitespace-only message text
    #[error("Message text is empty")]
    EmptyMessage,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for chatrelay operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
