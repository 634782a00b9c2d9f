//! chatrelay - terminal chat client and streaming proxy
//!
//! Main entry point for the chatrelay application.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatrelay::cli::{Cli, Commands};
use chatrelay::commands;
use chatrelay::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // If the user supplied a storage path on the CLI, mirror it into
    // CHATRELAY_STATE_DB so the storage initializer can pick it up without
    // threading the path through every caller.
    if let Some(db_path) = &cli.storage_path {
        std::env::set_var("CHATRELAY_STATE_DB", db_path);
        tracing::info!("Using storage DB override from CLI: {}", db_path);
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { .. } => {
            tracing::info!("Starting interactive chat");
            commands::chat::run_chat(config).await
        }
        Commands::Serve { .. } => {
            tracing::info!("Starting streaming proxy");
            commands::serve::run_serve(config).await
        }
        Commands::Clear => commands::clear::run_clear(),
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "chatrelay=debug"
    } else {
        "chatrelay=info"
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
