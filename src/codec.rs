//! Wire framing utilities.
//!
//! Frames are delimiter-based: the payload bytes followed by exactly one
//! `0x00` terminator, no length prefix. This is the GELF-over-TCP framing
//! convention; payloads must not contain the terminator byte themselves
//! (GELF messages are JSON text, which never does).

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Byte terminating every frame on the wire.
pub const FRAME_TERMINATOR: u8 = 0x00;

/// Build the wire form of a payload.
///
/// Returns a single contiguous buffer holding the payload bytes plus the
/// trailing terminator, so the whole frame goes out in one write call.
pub fn frame_payload(payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(payload.len() + 1);
    buf.put_slice(payload);
    buf.put_u8(FRAME_TERMINATOR);
    buf.freeze()
}

/// An incremental decoder for terminator-delimited frames.
///
/// This handles partial reads and accumulates data until a complete frame
/// is available. Intended for the collector side and for test harnesses
/// inspecting what a sender put on the wire.
#[derive(Debug)]
pub struct FrameDecoder {
    buffer: BytesMut,
}

impl FrameDecoder {
    /// Create a new frame decoder.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Create a new frame decoder with a specific buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Add data to the internal buffer.
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to extract one complete frame from the buffer.
    ///
    /// Returns `Some(payload)` (without the terminator) if a complete frame
    /// is available, `None` if more data is needed. An empty payload is a
    /// valid frame: a lone terminator byte.
    pub fn try_parse(&mut self) -> Option<Bytes> {
        let pos = self
            .buffer
            .iter()
            .position(|&byte| byte == FRAME_TERMINATOR)?;
        let payload = self.buffer.split_to(pos).freeze();
        self.buffer.advance(1);
        Some(payload)
    }

    /// Extract all complete frames from the buffer.
    pub fn parse_all(&mut self) -> Vec<Bytes> {
        let mut frames = Vec::new();
        while let Some(frame) = self.try_parse() {
            frames.push(frame);
        }
        frames
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Get the number of buffered bytes not yet parsed into frames.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
