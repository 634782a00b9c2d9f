//! Incremental assembly of the streamed assistant reply
//!
//! Consumes the proxy's SSE byte stream, decodes `{"content": …}` fragments,
//! and republishes the growing reply after every fragment.

use crate::error::Result;
use crate::sse::{SseFrameDecoder, DONE_SENTINEL};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Deserialize;

/// One incremental piece of assistant text, as framed by the proxy.
#[derive(Debug, Deserialize)]
struct Fragment {
    content: String,
}

/// Decode one SSE payload into assistant text
///
/// The `[DONE]` sentinel is skipped; stream end is signaled by the
/// underlying read completing, not by the sentinel. A payload that fails to
/// parse is logged and skipped without aborting the stream.
fn decode_fragment(payload: &str) -> Option<String> {
    if payload == DONE_SENTINEL {
        return None;
    }

    match serde_json::from_str::<Fragment>(payload) {
        Ok(fragment) => Some(fragment.content),
        Err(e) => {
            tracing::warn!("Skipping malformed stream fragment: {}", e);
            None
        }
    }
}

/// Drive an SSE byte stream to completion, growing the assistant reply
///
/// `publish` is invoked with the full reply text after every fragment (a
/// full-replace publish, not an append-only diff). Returns the final text on
/// normal end-of-stream. A read error propagates as `Err`; everything
/// already published stays published.
pub async fn assemble<S, F>(mut stream: S, mut publish: F) -> Result<String>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
    F: FnMut(&str),
{
    let mut decoder = SseFrameDecoder::new();
    let mut content = String::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        for payload in decoder.feed(&chunk) {
            if let Some(fragment) = decode_fragment(&payload) {
                content.push_str(&fragment);
                publish(&content);
            }
        }
    }

    // The final frame may have lacked its line terminator.
    if let Some(payload) = decoder.finish() {
        if let Some(fragment) = decode_fragment(&payload) {
            content.push_str(&fragment);
            publish(&content);
        }
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunks(parts: &[&str]) -> impl Stream<Item = Result<Bytes>> + Unpin {
        let items: Vec<Result<Bytes>> = parts
            .iter()
            .map(|p| Ok(Bytes::from(p.to_string())))
            .collect();
        stream::iter(items)
    }

    #[tokio::test]
    async fn test_assembles_fragments_in_order() {
        let stream = chunks(&[
            "data: {\"content\":\"A\"}\n\n",
            "data: {\"content\":\"B\"}\n\n",
            "data: [DONE]\n\n",
        ]);

        let mut published = Vec::new();
        let content = assemble(stream, |c| published.push(c.to_string()))
            .await
            .unwrap();

        assert_eq!(content, "AB");
        assert_eq!(published, vec!["A", "AB"]);
    }

    #[tokio::test]
    async fn test_multiple_frames_in_one_chunk() {
        let stream = chunks(&["data: {\"content\":\"A\"}\n\ndata: {\"content\":\"B\"}\n\n"]);

        let content = assemble(stream, |_| {}).await.unwrap();
        assert_eq!(content, "AB");
    }

    #[tokio::test]
    async fn test_frame_split_across_chunks() {
        let stream = chunks(&["data: {\"cont", "ent\":\"AB\"}\n\n"]);

        let content = assemble(stream, |_| {}).await.unwrap();
        assert_eq!(content, "AB");
    }

    #[tokio::test]
    async fn test_malformed_fragment_does_not_halt_assembly() {
        let stream = chunks(&[
            "data: {\"content\":\"A\"}\n\n",
            "data: this is not json\n\n",
            "data: {\"content\":\"B\"}\n\n",
        ]);

        let content = assemble(stream, |_| {}).await.unwrap();
        assert_eq!(content, "AB");
    }

    #[tokio::test]
    async fn test_done_sentinel_is_not_content() {
        let stream = chunks(&["data: [DONE]\n\n"]);

        let mut published = Vec::new();
        let content = assemble(stream, |c| published.push(c.to_string()))
            .await
            .unwrap();

        assert_eq!(content, "");
        assert!(published.is_empty());
    }

    #[tokio::test]
    async fn test_unterminated_final_frame_is_recovered() {
        let stream = chunks(&["data: {\"content\":\"A\"}\n\ndata: {\"content\":\"B\"}"]);

        let content = assemble(stream, |_| {}).await.unwrap();
        assert_eq!(content, "AB");
    }

    #[tokio::test]
    async fn test_read_error_propagates_after_partial_publish() {
        let items: Vec<Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"data: {\"content\":\"partial\"}\n\n")),
            Err(anyhow::anyhow!("connection reset")),
        ];
        let stream = stream::iter(items);

        let mut published = Vec::new();
        let result = assemble(stream, |c| published.push(c.to_string())).await;

        assert!(result.is_err());
        // Content published before the failure stays published.
        assert_eq!(published, vec!["partial"]);
    }
}
