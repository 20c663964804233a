//! Decoded frame type and the canonical frame encoder.
//!
//! A frame on the wire looks like this:
//!
//! ```text
//! ┌─────┬───────┬─────┬────────┬─────┬──────┬─────┬──────────┬─────┐
//! │ SYN │ noise │ SOH │ offset │ STX │ body │ EOT │ checksum │ ETB │
//! │ 16h │  ...  │ 01h │ digits │ 02h │ ...  │ 04h │ hex      │ 17h │
//! └─────┴───────┴─────┴────────┴─────┴──────┴─────┴──────────┴─────┘
//! ```
//!
//! The checksum is the 8-bit truncating sum of every byte after SYN up to
//! and including EOT.
//!
//! # Example
//!
//! ```
//! use scoreboard_receiver::protocol::{build_frame, control};
//!
//! let bytes = build_frame(1, b"OK");
//! assert_eq!(bytes[0], control::SYN);
//! assert_eq!(*bytes.last().unwrap(), control::ETB);
//! ```

use bytes::Bytes;

/// Offsets are accumulated modulo this value (5 decimal digits).
pub const OFFSET_MODULUS: usize = 100_000;

/// Number of offset digits written by [`build_frame`].
pub const OFFSET_DIGITS: usize = 5;

/// Control bytes of the framing protocol.
pub mod control {
    /// Synchronous idle: opens a frame.
    pub const SYN: u8 = 0x16;
    /// Start of header: offset digits follow.
    pub const SOH: u8 = 0x01;
    /// Start of text: body bytes follow.
    pub const STX: u8 = 0x02;
    /// End of transmission: checksum digits follow.
    pub const EOT: u8 = 0x04;
    /// End of transmission block: closes a frame.
    pub const ETB: u8 = 0x17;

    /// Any byte below space is a control byte.
    #[inline]
    pub fn is_control(byte: u8) -> bool {
        byte < 0x20
    }
}

/// A validated frame: `body` is written to the scoreboard at `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Absolute scoreboard position (already reduced modulo [`OFFSET_MODULUS`]).
    pub offset: usize,
    /// Body bytes (zero-copy slice of the datagram).
    pub body: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(offset: usize, body: Bytes) -> Self {
        Self { offset, body }
    }

    /// Get a reference to the body bytes.
    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// 8-bit truncating sum of `bytes`.
#[inline]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Build a complete frame as a single byte vector.
///
/// The offset is written as [`OFFSET_DIGITS`] decimal digits (reduced modulo
/// [`OFFSET_MODULUS`]) and the checksum as two uppercase hex digits.
///
/// # Example
///
/// ```
/// use scoreboard_receiver::protocol::{build_frame, FrameDecoder, Decoded};
/// use bytes::Bytes;
///
/// let bytes = Bytes::from(build_frame(42, b"HOME"));
/// let decoded = FrameDecoder::new().decode(&bytes).unwrap();
/// assert!(matches!(decoded, Decoded::Frame(f) if f.offset == 42 && f.body() == b"HOME"));
/// ```
pub fn build_frame(offset: usize, body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(body.len() + OFFSET_DIGITS + 7);
    buf.push(control::SYN);
    buf.push(control::SOH);
    buf.extend_from_slice(format!("{:05}", offset % OFFSET_MODULUS).as_bytes());
    buf.push(control::STX);
    buf.extend_from_slice(body);
    buf.push(control::EOT);

    // everything between SYN and the checksum digits
    let sum = checksum(&buf[1..]);
    buf.extend_from_slice(format!("{:02X}", sum).as_bytes());
    buf.push(control::ETB);
    buf
}
