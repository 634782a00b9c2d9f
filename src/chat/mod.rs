//! Client-side conversation handling
//!
//! This module contains the conversation store, the transport to the proxy,
//! and the incremental stream assembler that grows the assistant reply.

pub mod assembler;
pub mod store;
pub mod transport;

pub use store::ConversationStore;
pub use transport::{ChatByteStream, HttpTransport, ProxyTransport};
