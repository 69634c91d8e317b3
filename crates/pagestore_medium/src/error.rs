//! Error types for medium access.

use std::io;
use thiserror::Error;

/// Result type for medium operations.
pub type MediumResult<T> = Result<T, MediumError>;

/// Errors that can occur while accessing a non-volatile medium.
#[derive(Debug, Error)]
pub enum MediumError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The requested byte range is not inside the medium.
    #[error("access out of bounds: offset {offset}, len {len}, size {size}")]
    OutOfBounds {
        /// The requested offset.
        offset: u64,
        /// The requested length.
        len: usize,
        /// The total size of the medium.
        size: u64,
    },

    /// The hardware (or a simulated one) reported a fault.
    #[error("medium fault: {0}")]
    Fault(String),
}

impl MediumError {
    /// Creates a fault error.
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault(message.into())
    }
}
