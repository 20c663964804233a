//! Error types for scoreboard-receiver.

use std::net::SocketAddr;

use thiserror::Error;

/// Main error type for receiver operations.
///
/// Frame rejections and binding resolution failures have their own types
/// ([`FrameError`](crate::protocol::FrameError),
/// [`BindingError`](crate::binding::BindingError)); they are handled inside
/// the pipeline and never surface here.
#[derive(Debug, Error)]
pub enum ScoreboardError {
    /// I/O error during socket or configuration file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (configuration store).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The UDP socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The receive loop was started while the receiver is disabled.
    #[error("Receiver is disabled")]
    ReceiverDisabled,
}

/// Result type alias using ScoreboardError.
pub type Result<T> = std::result::Result<T, ScoreboardError>;
