//! Inbound gateway authorizer events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AuthError, AuthResult};

/// An authorizer invocation, validated from the raw gateway payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuthorizerEvent {
    /// A token authorizer event: the `Authorization` header value only.
    #[serde(rename = "TOKEN", rename_all = "camelCase")]
    Token {
        /// Raw `Authorization` header value.
        authorization_token: String,
        /// Identifier of the invoked method.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method_arn: Option<String>,
    },
}

impl AuthorizerEvent {
    /// Build a token event.
    #[must_use]
    pub fn token(authorization_token: impl Into<String>, method_arn: Option<String>) -> Self {
        Self::Token {
            authorization_token: authorization_token.into(),
            method_arn,
        }
    }

    /// Validate a raw gateway payload.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MalformedToken`] if the type marker is not
    /// `TOKEN` or `authorizationToken` is missing.
    pub fn from_value(value: Value) -> AuthResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| AuthError::MalformedToken(format!("invalid authorizer event: {e}")))
    }

    /// The raw `Authorization` header value.
    #[must_use]
    pub fn authorization_token(&self) -> &str {
        match self {
            Self::Token {
                authorization_token,
                ..
            } => authorization_token,
        }
    }

    /// The invoked method, when the gateway supplied it.
    #[must_use]
    pub fn method_arn(&self) -> Option<&str> {
        match self {
            Self::Token { method_arn, .. } => method_arn.as_deref(),
        }
    }
}
