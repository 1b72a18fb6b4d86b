//! Error types for rawsignal Frame

use thiserror::Error;

/// Frame processing error types
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Invalid frame format: {msg}")]
    InvalidFormat { msg: String },

    #[error("Frame size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Invalid address: {msg}")]
    InvalidAddress { msg: String },

    #[error("Invalid frame parameters: {msg}")]
    InvalidParameters { msg: String },

    #[error("Frame check sequence mismatch: computed {computed:#06x}, received {received:#06x}")]
    FcsMismatch { computed: u16, received: u16 },

    #[error("Core error: {0}")]
    Core(#[from] rawsignal_core::CoreError),
}

/// Result type for rawsignal Frame operations
pub type Result<T> = std::result::Result<T, FrameError>;
