//! Capability error types.

use thiserror::Error;

/// Errors that can occur while handling capability metadata.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// The propagated context string is not valid capability metadata.
    #[error("invalid capability context: {0}")]
    InvalidContext(String),

    /// Metadata could not be serialized.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Result type for capability operations.
pub type CapabilityResult<T> = Result<T, CapabilityError>;
