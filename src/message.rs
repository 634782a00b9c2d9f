//! Chat message types shared by the client and the proxy
//!
//! The wire format is the same on every edge: the client posts messages to
//! the proxy, and the proxy forwards them verbatim to the upstream API.

use serde::{Deserialize, Serialize};

/// A single message in the conversation
///
/// The role is a plain string ("user", "assistant", or "system") so the
/// struct serializes directly into the JSON the proxy and upstream expect.
/// Messages are immutable once appended, except for the in-progress
/// assistant message, which grows by appended deltas until its stream ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (user, assistant, system)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::message::Message;
    ///
    /// let msg = Message::user("Hello, assistant!");
    /// assert_eq!(msg.role, "user");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::message::Message;
    ///
    /// let msg = Message::assistant("Hello, user!");
    /// assert_eq!(msg.role, "assistant");
    /// ```
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new system message
    ///
    /// System messages only occur on the proxy-to-upstream edge; the client
    /// conversation holds user and assistant messages.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Returns true when this is an assistant message
    pub fn is_assistant(&self) -> bool {
        self.role == "assistant"
    }
}
