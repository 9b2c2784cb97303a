//! Incremental decoder for `text/event-stream` bodies.
//!
//! Bytes arrive in arbitrary chunks. [`FrameDecoder`] keeps the bytes of the
//! one frame that is still incomplete and hands back every frame that a chunk
//! completes. Frames are split on raw bytes: a `\n` byte can never be part of
//! a multi-byte UTF-8 sequence, so a code point cut across two chunks is only
//! decoded once its frame is whole.

use crate::{Error, Result};

const DELIMITER: &[u8] = b"\n\n";

/// One parsed event frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Value of the last `event: ` line, if any.
    pub event: Option<String>,
    /// Value of the last `data: ` line, if any.
    pub data: Option<String>,
}

impl Frame {
    /// Parse the lines of a single frame. Later lines of the same field win.
    pub fn parse(text: &str) -> Self {
        let mut frame = Frame::default();
        for line in text.split('\n') {
            if let Some(event) = line.strip_prefix("event: ") {
                frame.event = Some(event.to_string());
            } else if let Some(data) = line.strip_prefix("data: ") {
                frame.data = Some(data.to_string());
            }
        }
        frame
    }
}

/// Stateful accumulator that turns a chunked byte stream into [`Frame`]s.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    pending: Vec<u8>,
    // Bytes of `pending` already known not to start a delimiter.
    scanned: usize,
}

impl FrameDecoder {
    /// Create a decoder with an empty buffer.
    ///
    /// # Examples
    /// ```
    /// use plop_client::sse::FrameDecoder;
    ///
    /// let mut decoder = FrameDecoder::new();
    /// assert!(decoder.push(b"event: ping\ndata: {}").unwrap().is_empty());
    /// let frames = decoder.push(b"\n\n").unwrap();
    /// assert_eq!(frames[0].event.as_deref(), Some("ping"));
    /// decoder.finish().unwrap();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every frame it completes, in arrival order.
    ///
    /// Fails if a completed frame is not valid UTF-8.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Frame>> {
        self.pending.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(end) = self.find_delimiter() {
            let rest = self.pending.split_off(end + DELIMITER.len());
            let mut raw = std::mem::replace(&mut self.pending, rest);
            raw.truncate(end);
            self.scanned = 0;

            let text = String::from_utf8(raw)
                .map_err(|e| Error::Decode(format!("frame is not valid UTF-8: {e}")))?;
            if text.trim().is_empty() {
                continue;
            }
            frames.push(Frame::parse(&text));
        }
        Ok(frames)
    }

    /// Signal end of input. Leftover bytes mean the stream was cut mid-frame.
    pub fn finish(&mut self) -> Result<()> {
        let leftover = std::mem::take(&mut self.pending);
        self.scanned = 0;
        if leftover.iter().all(u8::is_ascii_whitespace) {
            Ok(())
        } else {
            Err(Error::Decode(format!(
                "stream ended inside a frame ({} bytes pending)",
                leftover.len()
            )))
        }
    }

    /// Number of bytes held for the incomplete frame.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn find_delimiter(&mut self) -> Option<usize> {
        let found = self.pending[self.scanned..]
            .windows(DELIMITER.len())
            .position(|w| w == DELIMITER)
            .map(|pos| self.scanned + pos);
        if found.is_none() {
            // The last byte may be the first half of a delimiter.
            self.scanned = self.pending.len().saturating_sub(DELIMITER.len() - 1);
        }
        found
    }
}
