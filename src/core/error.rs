//! Error types for the link layer.

use thiserror::Error;

/// Errors reported by link operations.
///
/// Line noise is not an error: the frame synchronizer absorbs unexpected
/// bytes by resynchronizing and never surfaces them.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The underlying device read, write, open or close failed.
    ///
    /// Always fatal to the current operation and never retried.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// No valid acknowledgment arrived within the configured timeout windows.
    #[error("no acknowledgment after {attempts} attempt(s)")]
    RetryExhausted {
        /// Number of times the frame was written.
        attempts: u32,
    },

    /// Invalid connection configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The operation is not allowed in the current connection phase.
    #[error("operation not allowed while link is {phase}")]
    InvalidPhase {
        /// Phase the link was in.
        phase: &'static str,
    },
}

impl LinkError {
    /// Check if the error is a handshake failure rather than a device fault.
    pub fn is_retry_exhausted(&self) -> bool {
        matches!(self, Self::RetryExhausted { .. })
    }

    /// Check if the error came from the underlying device.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Result type alias using `LinkError`.
pub type LinkResult<T> = Result<T, LinkError>;
