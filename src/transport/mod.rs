//! Transport module - the datagram source feeding the receiver.
//!
//! Provides a UDP socket wrapper that can be drained without blocking,
//! so every pending datagram is processed before bindings are evaluated.

mod udp;

pub use udp::{UdpSource, MAX_DATAGRAM_SIZE};
