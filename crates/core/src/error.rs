//! Error types for rawsignal Core

use thiserror::Error;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid sample rate: {rate}")]
    InvalidSampleRate { rate: u32 },

    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("Failed to allocate {len} elements for {what}")]
    AllocationFailed { what: &'static str, len: usize },

    #[error("FFT error: {msg}")]
    FftError { msg: String },

    #[error("Resampling error: {msg}")]
    ResampleError { msg: String },
}

/// Result type for rawsignal Core operations
pub type Result<T> = std::result::Result<T, CoreError>;
