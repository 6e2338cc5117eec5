//! Key resolution error types.

use thiserror::Error;

/// Errors that can occur while resolving a signing key.
///
/// Every variant is fatal to the request that triggered the resolution.
#[derive(Debug, Error)]
pub enum KeyResolutionError {
    /// The key set endpoint could not be reached or answered with an error.
    #[error("key set endpoint {url} unreachable: {message}")]
    Unreachable {
        /// Key set URL.
        url: String,
        /// Transport or status description.
        message: String,
    },

    /// The key set request exceeded its timeout.
    #[error("key set request to {url} timed out")]
    Timeout {
        /// Key set URL.
        url: String,
    },

    /// The key set was fetched but could not be understood.
    #[error("invalid key set: {0}")]
    InvalidKeySet(String),

    /// The requested key id is not published in the key set.
    #[error("signing key not found: {kid}")]
    KeyNotFound {
        /// The key id that was requested.
        kid: String,
    },

    /// Too many key set requests in the current window.
    #[error("key set rate limit exceeded ({limit} requests per minute)")]
    RateLimited {
        /// Configured requests per minute.
        limit: u32,
    },

    /// The key set URL or HTTP client could not be configured.
    #[error("key source configuration error: {0}")]
    Configuration(String),
}

/// Result type for key resolution.
pub type KeyResult<T> = Result<T, KeyResolutionError>;
