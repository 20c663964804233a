//! Candidate frame extraction from a single datagram.
//!
//! Uses `bytes::Bytes` so every candidate is a zero-copy slice of the
//! datagram. The scan is a two-state machine:
//! - no candidate open: everything except SYN is ignored
//! - candidate open at the last SYN: ETB closes it and yields `SYN ..= ETB`
//!
//! A SYN seen while a candidate is open restarts the candidate. Nothing is
//! rejected here; structural validation belongs to the decoder.
//!
//! # Example
//!
//! ```
//! use scoreboard_receiver::protocol::{build_frame, FrameExtractor};
//! use bytes::Bytes;
//!
//! let mut datagram = build_frame(1, b"A");
//! datagram.extend(build_frame(2, b"B"));
//!
//! let frames: Vec<Bytes> = FrameExtractor::new(Bytes::from(datagram)).collect();
//! assert_eq!(frames.len(), 2);
//! ```

use bytes::Bytes;

use super::control::{ETB, SYN};

/// Lazy iterator over the candidate frames of one datagram.
#[derive(Debug, Clone)]
pub struct FrameExtractor {
    /// The whole datagram.
    data: Bytes,
    /// Next byte to scan.
    pos: usize,
    /// Start of the open candidate (position of its SYN).
    start: Option<usize>,
}

impl FrameExtractor {
    /// Create an extractor over one datagram.
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            pos: 0,
            start: None,
        }
    }

    /// Create an extractor from a borrowed datagram (copies data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Whether a candidate is open (SYN seen, ETB not yet).
    pub fn is_open(&self) -> bool {
        self.start.is_some()
    }
}

impl Iterator for FrameExtractor {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        while self.pos < self.data.len() {
            let at = self.pos;
            self.pos += 1;

            match self.data[at] {
                SYN => self.start = Some(at),
                ETB => {
                    if let Some(start) = self.start.take() {
                        return Some(self.data.slice(start..self.pos));
                    }
                }
                _ => {}
            }
        }

        None
    }
}
