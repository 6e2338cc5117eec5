//! Authorization error types.

use capgate_crypto::KeyResolutionError;
use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

/// Reasons a bearer token is refused.
///
/// Every variant is fatal to the request; none is retried. The gateway
/// boundary collapses all of them into an opaque `Unauthorized`.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The event, header value or token structure is not usable.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The signing key could not be resolved.
    #[error("key resolution failed: {0}")]
    KeyResolution(#[from] KeyResolutionError),

    /// The signature does not verify, or the algorithm is not accepted.
    #[error("invalid token signature")]
    SignatureInvalid,

    /// The `iss` claim is missing or unexpected.
    #[error("token issuer mismatch")]
    IssuerMismatch,

    /// The `aud` claim is missing or unexpected.
    #[error("token audience mismatch")]
    AudienceMismatch,

    /// The token's `exp` has passed.
    #[error("token expired")]
    TokenExpired,

    /// The token's `nbf` is in the future.
    #[error("token not yet valid")]
    TokenNotYetValid,

    /// The authorizer could not be built from its configuration.
    #[error("authorizer configuration error: {0}")]
    Configuration(String),
}

impl AuthError {
    /// Short, stable name of the variant, for structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedToken(_) => "malformed_token",
            Self::KeyResolution(_) => "key_resolution",
            Self::SignatureInvalid => "signature_invalid",
            Self::IssuerMismatch => "issuer_mismatch",
            Self::AudienceMismatch => "audience_mismatch",
            Self::TokenExpired => "token_expired",
            Self::TokenNotYetValid => "token_not_yet_valid",
            Self::Configuration(_) => "configuration",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::SignatureInvalid,
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            ErrorKind::ImmatureSignature => Self::TokenNotYetValid,
            ErrorKind::InvalidIssuer => Self::IssuerMismatch,
            ErrorKind::InvalidAudience => Self::AudienceMismatch,
            ErrorKind::MissingRequiredClaim(claim) => match claim.as_str() {
                "iss" => Self::IssuerMismatch,
                "aud" => Self::AudienceMismatch,
                other => Self::MalformedToken(format!("missing required claim '{other}'")),
            },
            _ => Self::MalformedToken(err.to_string()),
        }
    }
}

/// Result type for authorization.
pub type AuthResult<T> = Result<T, AuthError>;
