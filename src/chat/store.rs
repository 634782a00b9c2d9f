//! Conversation state ownership and the send/receive driving loop

use crate::chat::assembler;
use crate::chat::transport::ProxyTransport;
use crate::error::{ChatRelayError, Result};
use crate::message::Message;
use crate::storage::ConversationLog;

/// Owns the ordered message sequence and drives sends against the proxy
///
/// The store is an explicitly lifecycled object: it is constructed with a
/// transport and a storage handle and restores prior state exactly once.
/// Every conversation mutation rewrites the full message sequence to
/// storage.
///
/// Invariant: at most one assistant message is in progress at any time, and
/// while a send is running it is always the last element.
pub struct ConversationStore {
    messages: Vec<Message>,
    transport: Box<dyn ProxyTransport>,
    storage: ConversationLog,
    in_flight: bool,
}

impl ConversationStore {
    /// Create a store, restoring any previously persisted conversation
    ///
    /// # Errors
    ///
    /// Returns error if storage cannot be read. A stored payload that fails
    /// to deserialize is not an error; it yields an empty conversation.
    pub fn new(transport: Box<dyn ProxyTransport>, storage: ConversationLog) -> Result<Self> {
        let messages = storage.load()?.unwrap_or_default();
        Ok(Self {
            messages,
            transport,
            storage,
            in_flight: false,
        })
    }

    /// Current conversation snapshot
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages in the conversation
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the conversation has no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Send a user message and stream the assistant reply
    ///
    /// Rejects empty or whitespace-only text with `EmptyMessage`. Rejects a
    /// second call while one is running with `RequestInFlight`; the
    /// in-flight slot is an explicit token, not an advisory flag.
    ///
    /// Appends the user message, issues the request, then grows an assistant
    /// message from the stream, invoking `on_update` with the full message
    /// snapshot after every fragment.
    ///
    /// On a request failure (network error, non-success status) the attempted
    /// user message is removed and the conversation reverts to its pre-send
    /// state. A failure after streaming has begun keeps the assistant content
    /// that already arrived: only pre-stream failures roll back.
    pub async fn send<F>(&mut self, text: &str, mut on_update: F) -> Result<()>
    where
        F: FnMut(&[Message]),
    {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatRelayError::EmptyMessage.into());
        }
        if self.in_flight {
            return Err(ChatRelayError::RequestInFlight.into());
        }

        self.in_flight = true;
        let result = self.send_inner(text, &mut on_update).await;
        self.in_flight = false;
        result
    }

    async fn send_inner<F>(&mut self, text: &str, on_update: &mut F) -> Result<()>
    where
        F: FnMut(&[Message]),
    {
        self.messages.push(Message::user(text));
        self.persist();
        on_update(&self.messages);

        let stream = match self.transport.send_chat(&self.messages).await {
            Ok(stream) => stream,
            Err(e) => {
                // Remove the attempted user message: the conversation
                // reverts to its pre-send state.
                self.messages.pop();
                self.persist();
                on_update(&self.messages);
                return Err(e);
            }
        };

        // Placeholder the assembler fills fragment by fragment.
        self.messages.push(Message::assistant(""));
        self.persist();
        on_update(&self.messages);

        let result = {
            let messages = &mut self.messages;
            let storage = &self.storage;
            assembler::assemble(stream, |content| {
                if let Some(last) = messages.last_mut() {
                    last.content = content.to_string();
                }
                persist_snapshot(storage, &messages[..]);
                on_update(&messages[..]);
            })
            .await
        };

        match result {
            Ok(content) => {
                if let Some(last) = self.messages.last_mut() {
                    last.content = content;
                }
                self.persist();
                Ok(())
            }
            Err(e) => {
                // Assistant content that already streamed in stays visible.
                self.persist();
                Err(e)
            }
        }
    }

    /// Reset the conversation and remove the persisted log
    ///
    /// Clearing an already empty conversation yields the same empty state.
    pub fn clear(&mut self) -> Result<()> {
        self.messages.clear();
        self.storage.clear()?;
        Ok(())
    }

    fn persist(&self) {
        persist_snapshot(&self.storage, &self.messages);
    }
}

/// Persist the full message sequence, logging instead of failing the send.
fn persist_snapshot(storage: &ConversationLog, messages: &[Message]) {
    if let Err(e) = storage.save(messages) {
        tracing::warn!("Failed to persist conversation: {}", e);
    }
}
