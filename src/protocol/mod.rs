//! Protocol module - framing, frame decoding and the frame encoder.
//!
//! The scoreboard feed is a byte-oriented, control-character-delimited
//! protocol carried in UDP datagrams:
//! - [`FrameExtractor`] splits one datagram into candidate frames (SYN .. ETB)
//! - [`FrameDecoder`] validates a candidate and yields an `(offset, body)` [`Frame`]
//! - [`build_frame`] produces canonical frames (replay, simulation, tests)

mod decoder;
mod extractor;
mod frame;

pub use decoder::{Decoded, FrameDecoder, FrameError};
pub use extractor::FrameExtractor;
pub use frame::{build_frame, checksum, control, Frame, OFFSET_DIGITS, OFFSET_MODULUS};
