//! Upstream completion provider abstraction
//!
//! The proxy depends on the [`CompletionProvider`] trait; the concrete
//! implementation owns the upstream request/response contract and its
//! credential handling.

pub mod openai;

pub use openai::OpenAiProvider;

use crate::error::Result;
use crate::message::Message;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Stream of incremental content fragments from the upstream model.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Upstream chat-completion provider
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Request a streamed completion for the conversation
    ///
    /// Returns a stream of content deltas. Connection and non-success-status
    /// failures are reported by this call; mid-stream failures surface as
    /// `Err` items on the stream. No retry in either case.
    async fn stream_completion(&self, messages: &[Message]) -> Result<FragmentStream>;
}
