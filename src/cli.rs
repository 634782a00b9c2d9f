//! Command-line interface definition for chatrelay
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the chat client, the proxy server, and
//! persisted-state removal.

use clap::{Parser, Subcommand};

/// chatrelay - terminal chat client and streaming proxy
///
/// Chat with an OpenAI-compatible model through a local single-endpoint
/// streaming proxy.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatrelay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the conversation database path
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for chatrelay
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the interactive chat client
    Chat {
        /// Override the proxy chat endpoint URL
        #[arg(short, long)]
        endpoint: Option<String>,
    },

    /// Run the streaming proxy server
    Serve {
        /// Override the listen address (host:port)
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Clear the persisted conversation
    Clear,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: None,
            verbose: false,
            storage_path: None,
            command: Commands::Chat { endpoint: None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, None);
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Chat { endpoint: None }));
    }

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["chatrelay", "chat"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        assert!(matches!(cli.command, Commands::Chat { .. }));
    }

    #[test]
    fn test_cli_parse_chat_with_endpoint() {
        let cli = Cli::try_parse_from([
            "chatrelay",
            "chat",
            "--endpoint",
            "http://localhost:9000/functions/v1/chat",
        ]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Chat { endpoint } = cli.command {
            assert_eq!(
                endpoint,
                Some("http://localhost:9000/functions/v1/chat".to_string())
            );
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_serve_command() {
        let cli = Cli::try_parse_from(["chatrelay", "serve"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Serve { listen } = cli.command {
            assert_eq!(listen, None);
        } else {
            panic!("Expected Serve command");
        }
    }

    #[test]
    fn test_cli_parse_serve_with_listen() {
        let cli = Cli::try_parse_from(["chatrelay", "serve", "--listen", "0.0.0.0:8080"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        if let Commands::Serve { listen } = cli.command {
            assert_eq!(listen, Some("0.0.0.0:8080".to_string()));
        } else {
            panic!("Expected Serve command");
        }
    }

    #[test]
    fn test_cli_parse_clear_command() {
        let cli = Cli::try_parse_from(["chatrelay", "clear"]);
        assert!(cli.is_ok());
        assert!(matches!(cli.unwrap().command, Commands::Clear));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::try_parse_from(["chatrelay", "--config", "custom.yaml", "chat"]);
        assert!(cli.is_ok());
        assert_eq!(cli.unwrap().config, Some("custom.yaml".to_string()));
    }

    #[test]
    fn test_cli_parse_with_verbose() {
        let cli = Cli::try_parse_from(["chatrelay", "-v", "serve"]);
        assert!(cli.is_ok());
        assert!(cli.unwrap().verbose);
    }

    #[test]
    fn test_cli_parse_with_storage_path() {
        let cli = Cli::try_parse_from(["chatrelay", "--storage-path", "/tmp/chat.db", "clear"]);
        assert!(cli.is_ok());
        assert_eq!(cli.unwrap().storage_path, Some("/tmp/chat.db".to_string()));
    }

    #[test]
    fn test_cli_parse_missing_command() {
        let cli = Cli::try_parse_from(["chatrelay"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_parse_invalid_command() {
        let cli = Cli::try_parse_from(["chatrelay", "invalid"]);
        assert!(cli.is_err());
    }
}
