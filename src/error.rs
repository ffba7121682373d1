//! Error types for the Palisade synthesizer

use thiserror::Error;

/// Main error type for Palisade operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Validation error for stack configuration
    #[error("validation error: {0}")]
    Validation(String),

    /// Manifest serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error writing synthesized manifests
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}
