//! Handler error types and the status table.

use thiserror::Error;

/// Errors a downstream handler can return.
///
/// [`HandlerError::status_and_code`] is the only place these become HTTP
/// statuses. Internal detail is logged, never sent to the caller.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// No usable authorizer context or principal.
    #[error("request is not authenticated: {0}")]
    NotAuthenticated(String),

    /// The principal lacks the required capability.
    #[error("capability '{capability}' not granted: {reason}")]
    NotAuthorised {
        /// Required capability.
        capability: String,
        /// Why it was refused (absent or expired).
        reason: String,
    },

    /// A call to an external service failed.
    #[error("{service} request failed: {message}")]
    Upstream {
        /// The failing service.
        service: &'static str,
        /// Failure description.
        message: String,
    },

    /// Any other failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// HTTP status and public error code.
    #[must_use]
    pub fn status_and_code(&self) -> (u16, &'static str) {
        match self {
            Self::NotAuthenticated(_) => (401, "NOT_AUTHENTICATED"),
            Self::NotAuthorised { .. } => (403, "NOT_AUTHORISED"),
            Self::Upstream { .. } | Self::Internal(_) => (500, "REQUEST_FAILURE"),
        }
    }

    /// HTTP status.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status_and_code().0
    }

    /// Public error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.status_and_code().1
    }
}

/// Result type for handlers.
pub type HandlerResult<T> = Result<T, HandlerError>;
