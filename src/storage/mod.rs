use crate::error::{ChatRelayError, Result};
use crate::message::Message;
use anyhow::Context;
use chrono::Utc;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;

/// Well-known key under which the single conversation is stored.
const LOG_KEY: &str = "chat";

/// Durable storage for the conversation log
///
/// A single-row table holds the full JSON-serialized message array under one
/// well-known key. The row is rewritten in full on every conversation change
/// and deleted on clear; there is no schema versioning.
pub struct ConversationLog {
    db_path: PathBuf,
}

impl ConversationLog {
    /// Create a storage instance in the user's data directory
    ///
    /// The database path can be overridden with the `CHATRELAY_STATE_DB`
    /// environment variable, which makes it easy to point the binary at a
    /// test database or alternate file.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("CHATRELAY_STATE_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "chatrelay", "chatrelay")
            .ok_or_else(|| ChatRelayError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| ChatRelayError::Storage(e.to_string()))?;

        Self::new_with_path(data_dir.join("conversation.db"))
    }

    /// Create a storage instance that uses the specified database path
    ///
    /// Primarily useful for tests where the default application data
    /// directory is not desirable.
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure parent directory exists so opening the DB file succeeds.
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| ChatRelayError::Storage(e.to_string()))?;
        }

        let log = Self { db_path };
        log.init()?;
        Ok(log)
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS conversation_log (
                key TEXT PRIMARY KEY,
                messages TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| ChatRelayError::Storage(e.to_string()))?;

        Ok(())
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| ChatRelayError::Storage(e.to_string()))?;
        Ok(conn)
    }

    /// Overwrite the stored conversation with the full message sequence
    pub fn save(&self, messages: &[Message]) -> Result<()> {
        let conn = self.open()?;

        let messages_json = serde_json::to_string(messages)
            .context("Failed to serialize messages")
            .map_err(|e| ChatRelayError::Storage(e.to_string()))?;

        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO conversation_log (key, messages, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
                messages = excluded.messages,
                updated_at = excluded.updated_at",
            params![LOG_KEY, messages_json, now],
        )
        .context("Failed to write conversation")
        .map_err(|e| ChatRelayError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Load the stored conversation
    ///
    /// Returns `None` when nothing has been stored. A payload that fails to
    /// deserialize is logged and treated as absent; the next save overwrites
    /// it.
    pub fn load(&self) -> Result<Option<Vec<Message>>> {
        let conn = self.open()?;

        let row: Option<String> = conn
            .query_row(
                "SELECT messages FROM conversation_log WHERE key = ?",
                params![LOG_KEY],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query conversation")
            .map_err(|e| ChatRelayError::Storage(e.to_string()))?;

        match row {
            Some(messages_json) => match serde_json::from_str(&messages_json) {
                Ok(messages) => Ok(Some(messages)),
                Err(e) => {
                    tracing::warn!("Discarding unreadable conversation log: {}", e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Remove the stored conversation
    ///
    /// Removing an absent row is a no-op, so clearing twice is safe.
    pub fn clear(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "DELETE FROM conversation_log WHERE key = ?",
            params![LOG_KEY],
        )
        .context("Failed to delete conversation")
        .map_err(|e| ChatRelayError::Storage(e.to_string()))?;

        Ok(())
    }
}
