//! Incremental Server-Sent-Events frame decoding
//!
//! The decoder buffers raw bytes until a complete line is available, so a
//! frame may span multiple reads and a single read may carry many frames.
//! Partial lines (including split multi-byte sequences) are carried across
//! reads rather than assuming frame boundaries align with read boundaries.

/// Sentinel payload marking logical stream completion.
///
/// The sentinel is redundant with the transport's own end-of-stream signal;
/// consumers skip it rather than treating it as data.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Field prefix of an SSE data line.
const DATA_PREFIX: &str = "data:";

/// Incremental decoder for `text/event-stream` framed bytes
///
/// Each complete `data:`-prefixed line yields one payload. Blank lines
/// (frame separators) and other SSE field lines are ignored.
#[derive(Debug, Default)]
pub struct SseFrameDecoder {
    buf: Vec<u8>,
}

impl SseFrameDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw chunk, returning every payload it completes
    ///
    /// # Examples
    ///
    /// ```
    /// use chatrelay::sse::SseFrameDecoder;
    ///
    /// let mut decoder = SseFrameDecoder::new();
    /// assert!(decoder.feed(b"data: {\"content\"").is_empty());
    /// let payloads = decoder.feed(b":\"hi\"}\n\n");
    /// assert_eq!(payloads, vec![r#"{"content":"hi"}"#.to_string()]);
    /// ```
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            if let Some(payload) = decode_line(&line[..line.len() - 1]) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Drain a trailing unterminated line
    ///
    /// Called once the transport signals end-of-stream, in case the final
    /// frame lacked its line terminator.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buf);
        decode_line(&line)
    }
}

/// Decode one complete line into its `data:` payload, if any.
fn decode_line(line: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(line);
    let text = text.as_ref();
    let text = text.strip_suffix('\r').unwrap_or(text);

    let value = text.strip_prefix(DATA_PREFIX)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
