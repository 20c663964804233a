//! Scoreboard buffer - the addressable scoreboard state.
//!
//! A single growable byte array indexed by absolute scoreboard position.
//! Positions never written read as space (`0x20`). The buffer only grows:
//! [`ScoreboardBuffer::apply`] extends it to exactly `offset + body.len()`
//! when needed, padding with spaces.
//!
//! # Example
//!
//! ```
//! use scoreboard_receiver::ScoreboardBuffer;
//!
//! let mut buffer = ScoreboardBuffer::new();
//! buffer.apply(1, b"OK");
//! assert_eq!(buffer.as_bytes(), b" OK");
//! assert_eq!(&*buffer.range(0, 5), b" OK  ");
//! ```

use std::borrow::Cow;

use bytes::BytesMut;

/// Fill byte for positions that have not been written.
pub const FILL: u8 = b' ';

/// Growable, space-padded scoreboard state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreboardBuffer {
    data: BytesMut,
}

impl ScoreboardBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `body` at `offset`, growing the buffer with spaces first if
    /// `offset + body.len()` exceeds the current length.
    ///
    /// A write whose end is not addressable (`offset + body.len()` overflows)
    /// is ignored.
    pub fn apply(&mut self, offset: usize, body: &[u8]) {
        let Some(end) = offset.checked_add(body.len()) else {
            return;
        };
        if end > self.data.len() {
            self.data.resize(end, FILL);
        }
        self.data[offset..end].copy_from_slice(body);
    }

    /// Read `len` positions starting at `start`.
    ///
    /// Positions past the end of the buffer read as spaces, so the result
    /// always has exactly `len` bytes. Borrows when the range is in bounds.
    pub fn range(&self, start: usize, len: usize) -> Cow<'_, [u8]> {
        let end = start.saturating_add(len);
        if end <= self.data.len() {
            return Cow::Borrowed(&self.data[start..end]);
        }

        let mut padded = Vec::with_capacity(len);
        if start < self.data.len() {
            padded.extend_from_slice(&self.data[start..]);
        }
        padded.resize(len, FILL);
        Cow::Owned(padded)
    }

    /// The written part of `len` positions starting at `start`.
    ///
    /// Shorter than `len` (possibly empty) when the range runs past the end;
    /// the missing positions read as spaces. Never allocates.
    pub fn written(&self, start: usize, len: usize) -> &[u8] {
        let end = start.saturating_add(len).min(self.data.len());
        let start = start.min(end);
        &self.data[start..end]
    }

    /// The whole buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of addressable positions written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
