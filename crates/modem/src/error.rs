//! Error types for rawsignal Modem

use thiserror::Error;

/// Modem error types
#[derive(Error, Debug)]
pub enum ModemError {
    #[error("Invalid modulation parameters: {msg}")]
    InvalidParameters { msg: String },

    #[error("Frame error: {0}")]
    Frame(#[from] rawsignal_frame::FrameError),

    #[error("Core error: {0}")]
    Core(#[from] rawsignal_core::CoreError),
}

/// Result type for rawsignal Modem operations
pub type Result<T> = std::result::Result<T, ModemError>;
