//! Error types for rawsignal Codecs

use thiserror::Error;

/// Codec error types
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Encoding failed: {msg}")]
    EncodingFailed { msg: String },

    #[error("Invalid codec parameters: {msg}")]
    InvalidParameters { msg: String },

    #[error("Core error: {0}")]
    Core(#[from] rawsignal_core::CoreError),
}

/// Result type for rawsignal Codec operations
pub type Result<T> = std::result::Result<T, CodecError>;
