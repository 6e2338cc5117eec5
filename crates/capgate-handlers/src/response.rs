//! Proxy responses with the shared default headers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{HandlerError, HandlerResult};

/// Headers attached to every response.
pub const DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("Content-Type", "application/json"),
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Credentials", "true"),
];

/// A proxied response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    /// HTTP status.
    pub status_code: u16,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
    /// Response body.
    pub body: String,
}

impl HandlerResponse {
    /// A response with the default headers.
    #[must_use]
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            headers: DEFAULT_HEADERS
                .iter()
                .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
                .collect(),
            body: body.into(),
        }
    }

    /// A JSON response.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Internal`] if `body` cannot be serialized.
    pub fn json<T: Serialize>(status_code: u16, body: &T) -> HandlerResult<Self> {
        let body =
            serde_json::to_string(body).map_err(|e| HandlerError::Internal(e.to_string()))?;
        Ok(Self::new(status_code, body))
    }

    /// `204 No Content` with an empty body.
    #[must_use]
    pub fn no_content() -> Self {
        Self::new(204, "")
    }

    /// The response for `err`, per the status table.
    #[must_use]
    pub fn from_error(err: &HandlerError) -> Self {
        let (status, code) = err.status_and_code();
        Self::new(status, json!({ "error": code }).to_string())
    }
}

impl From<HandlerError> for HandlerResponse {
    fn from(err: HandlerError) -> Self {
        Self::from_error(&err)
    }
}
