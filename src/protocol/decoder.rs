//! Frame decoder.
//!
//! Validates one candidate frame with a state machine driven strictly by
//! control bytes:
//!
//! ```text
//!  NONE ──SYN──► SYNC ──SOH──► HEAD ──STX──► BODY ──EOT──► CHECKSUM
//! ```
//!
//! Per-section rules for printable bytes:
//! - `SYNC`: current-loop synchronization noise, ignored
//! - `HEAD`: decimal digits, accumulated modulo [`OFFSET_MODULUS`]
//! - `BODY`: kept verbatim
//! - `CHECKSUM`: uppercase hex digits, accumulated big-endian into a `u8`
//!
//! EOT outside of `BODY` is not an error: some controllers emit body-less
//! frames. Such frames decode to [`Decoded::Empty`] and must not be counted
//! as drops.

use bytes::Bytes;
use thiserror::Error;

use super::frame::{control, Frame, OFFSET_MODULUS};

/// Reason a candidate frame was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("unexpected SYN")]
    UnexpectedSyn,

    #[error("unexpected SOH")]
    UnexpectedSoh,

    #[error("unexpected STX")]
    UnexpectedStx,

    #[error("illegal control character 0x{0:02X}")]
    IllegalControl(u8),

    #[error("data outside of frame")]
    DataOutsideFrame,

    #[error("non-digit in offset field")]
    NonDigitOffset,

    #[error("non-hex character in checksum field")]
    NonHexChecksum,

    #[error("unexpected end of frame")]
    UnexpectedEnd,

    #[error("invalid checksum (computed {computed:02X}, received {received:02X})")]
    InvalidChecksum { computed: u8, received: u8 },
}

impl FrameError {
    /// Whether this rejection is a checksum mismatch rather than a
    /// structural error.
    pub fn is_checksum_mismatch(&self) -> bool {
        matches!(self, FrameError::InvalidChecksum { .. })
    }
}

/// Successful decoder outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A complete, validated frame ready to be applied.
    Frame(Frame),
    /// A body-less frame (EOT before STX); discarded silently.
    Empty,
}

/// Frame section, advanced only by control bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Sync,
    Head,
    Body,
    Checksum,
}

/// Validates candidate frames and extracts `(offset, body)`.
#[derive(Debug, Clone, Copy)]
pub struct FrameDecoder {
    /// Reject frames whose received checksum does not match.
    validate_checksums: bool,
}

impl FrameDecoder {
    /// Create a decoder that validates checksums.
    pub fn new() -> Self {
        Self {
            validate_checksums: true,
        }
    }

    /// Create a decoder with checksum validation switched on or off.
    ///
    /// With validation off, frames are accepted whatever their checksum
    /// field says (it must still be well-formed hex).
    pub fn with_checksum_validation(validate_checksums: bool) -> Self {
        Self { validate_checksums }
    }

    /// Whether checksums are validated.
    pub fn validates_checksums(&self) -> bool {
        self.validate_checksums
    }

    /// Decode one candidate frame (`SYN ..= ETB`).
    ///
    /// The trailing ETB is optional; decoding stops at the first ETB.
    /// The body of the returned frame is a zero-copy slice of `frame`.
    pub fn decode(&self, frame: &Bytes) -> Result<Decoded, FrameError> {
        let mut section = Section::None;
        let mut offset = 0usize;
        let mut computed = 0u8;
        let mut received = 0u8;
        let mut body_start = 0usize;
        let mut body_end = 0usize;

        for (i, &c) in frame.iter().enumerate() {
            if c == control::ETB {
                break;
            }

            // control bytes count towards the sum of the section they end
            if !matches!(section, Section::None | Section::Checksum) {
                computed = computed.wrapping_add(c);
            }

            if control::is_control(c) {
                section = match (c, section) {
                    (control::SYN, Section::None) => Section::Sync,
                    (control::SYN, _) => return Err(FrameError::UnexpectedSyn),
                    (control::SOH, Section::Sync) => Section::Head,
                    (control::SOH, _) => return Err(FrameError::UnexpectedSoh),
                    (control::STX, Section::Head) => {
                        body_start = i + 1;
                        Section::Body
                    }
                    (control::STX, _) => return Err(FrameError::UnexpectedStx),
                    (control::EOT, Section::Body) => {
                        body_end = i;
                        Section::Checksum
                    }
                    (control::EOT, _) => return Ok(Decoded::Empty),
                    (other, _) => return Err(FrameError::IllegalControl(other)),
                };
                continue;
            }

            match section {
                Section::None => return Err(FrameError::DataOutsideFrame),
                Section::Sync | Section::Body => {}
                Section::Head => {
                    if !c.is_ascii_digit() {
                        return Err(FrameError::NonDigitOffset);
                    }
                    offset = (offset * 10 + usize::from(c - b'0')) % OFFSET_MODULUS;
                }
                Section::Checksum => {
                    let digit = hex_value(c).ok_or(FrameError::NonHexChecksum)?;
                    received = (received << 4) | digit;
                }
            }
        }

        if section != Section::Checksum {
            return Err(FrameError::UnexpectedEnd);
        }

        if self.validate_checksums && computed != received {
            return Err(FrameError::InvalidChecksum { computed, received });
        }

        Ok(Decoded::Frame(Frame::new(
            offset,
            frame.slice(body_start..body_end),
        )))
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Value of an uppercase hex digit.
#[inline]
fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 0xA),
        _ => None,
    }
}
