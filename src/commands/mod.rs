/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`  — Interactive chat client
- `serve` — Run the streaming proxy
- `clear` — Remove the persisted conversation

These handlers are intentionally small and use the library components:
the conversation store, the proxy server, and storage.
*/

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Instantiates the transport, storage, and conversation store, then
    //! runs a readline-based loop that submits user input and renders the
    //! assistant reply as it streams in.

    use crate::chat::{ConversationStore, HttpTransport};
    use crate::config::Config;
    use crate::error::Result;
    use crate::message::Message;
    use crate::storage::ConversationLog;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::io::Write;

    /// Generic user-facing failure line. All send failure categories
    /// collapse into this one notification.
    const SEND_FAILED: &str = "Failed to send message. Please try again.";

    /// Start the interactive chat client
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    pub async fn run_chat(config: Config) -> Result<()> {
        let transport = HttpTransport::new(config.client.endpoint.clone())?;
        let storage = ConversationLog::new()?;
        let mut store = ConversationStore::new(Box::new(transport), storage)?;

        println!(
            "{} {}",
            "chatrelay".bold(),
            format!("({})", config.client.endpoint).dimmed()
        );
        println!("Type {} for commands\n", "/help".cyan());

        if !store.is_empty() {
            print_history(store.messages());
            println!();
        }

        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline(">> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    rl.add_history_entry(trimmed)?;

                    match trimmed {
                        "/quit" | "/exit" => break,
                        "/help" => {
                            print_help();
                            continue;
                        }
                        "/history" => {
                            print_history(store.messages());
                            continue;
                        }
                        "/clear" => {
                            store.clear()?;
                            println!("{}", "Conversation cleared".green());
                            continue;
                        }
                        _ => {}
                    }

                    if let Err(e) = send_and_render(&mut store, trimmed).await {
                        tracing::warn!("Send failed: {}", e);
                        println!("{}", SEND_FAILED.red());
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// Send one message, printing the assistant reply as it streams in.
    ///
    /// The store publishes full-conversation snapshots on every fragment;
    /// only the unseen suffix of the reply is written to the terminal.
    async fn send_and_render(store: &mut ConversationStore, text: &str) -> Result<()> {
        let mut printed = 0usize;

        let result = store
            .send(text, |messages| {
                let Some(reply) = messages.last().filter(|m| m.is_assistant()) else {
                    return;
                };
                if reply.content.len() > printed {
                    print!("{}", &reply.content[printed..]);
                    let _ = std::io::stdout().flush();
                    printed = reply.content.len();
                }
            })
            .await;

        if printed > 0 {
            println!();
        }

        result
    }

    fn print_help() {
        println!("Commands:");
        println!("  /history   Show the full conversation");
        println!("  /clear     Clear the conversation and its persisted state");
        println!("  /help      Show this help");
        println!("  /quit      Exit");
    }

    fn print_history(messages: &[Message]) {
        for message in messages {
            let tag = if message.is_assistant() {
                "assistant".cyan()
            } else {
                "you".green()
            };
            println!("{}: {}", tag, message.content);
        }
    }
}

// Proxy server handler
pub mod serve {
    //! Proxy server handler.

    use crate::config::Config;
    use crate::error::Result;
    use crate::providers::OpenAiProvider;
    use crate::server::ProxyServer;
    use std::sync::Arc;

    /// Run the streaming proxy until interrupted
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    ///
    /// # Errors
    ///
    /// Returns error if upstream credentials are missing or the listen
    /// address cannot be bound.
    pub async fn run_serve(config: Config) -> Result<()> {
        let provider = OpenAiProvider::new(config.proxy.upstream.clone())?;
        let server = ProxyServer::new(config.proxy, Arc::new(provider));
        server.run().await
    }
}

// Persisted-state removal handler
pub mod clear {
    //! Persisted-state removal handler.

    use crate::error::Result;
    use crate::storage::ConversationLog;
    use colored::Colorize;

    /// Remove the persisted conversation log
    pub fn run_clear() -> Result<()> {
        let storage = ConversationLog::new()?;
        storage.clear()?;
        println!("{}", "Conversation cleared".green());
        Ok(())
    }
}
