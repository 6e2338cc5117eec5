//! Per-invocation context for correlating log events.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context carried through one authorizer or handler invocation.
///
/// Every log event emitted inside [`RequestContext::span`] carries the
/// invocation id and, once known, the authenticated principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Unique invocation identifier.
    pub request_id: Uuid,
    /// Identifier assigned by the gateway, when it supplies one.
    pub gateway_request_id: Option<String>,
    /// Component that created this context (`authorizer`, `get-thing`, ...).
    pub source: String,
    /// Operation being performed.
    pub operation: Option<String>,
    /// Subject of the verified token, once known.
    pub principal_id: Option<String>,
    /// When the invocation started.
    pub started_at: DateTime<Utc>,
    /// Additional fields.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl RequestContext {
    /// Create a new context for `source`.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            gateway_request_id: None,
            source: source.into(),
            operation: None,
            principal_id: None,
            started_at: Utc::now(),
            metadata: BTreeMap::new(),
        }
    }

    /// Record the gateway's own request identifier.
    #[must_use]
    pub fn with_gateway_request_id(mut self, id: impl Into<String>) -> Self {
        self.gateway_request_id = Some(id.into());
        self
    }

    /// Set the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Set the authenticated principal.
    #[must_use]
    pub fn with_principal(mut self, principal_id: impl Into<String>) -> Self {
        self.principal_id = Some(principal_id.into());
        self
    }

    /// Add metadata.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Time since the invocation started. Never negative.
    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now()
            .signed_duration_since(self.started_at)
            .max(chrono::Duration::zero())
    }

    /// Elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        self.elapsed().num_milliseconds()
    }

    /// A tracing span carrying this context.
    ///
    /// `principal` is declared empty so it can be recorded after the token
    /// has been verified.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "invocation",
            request_id = %self.short_id(),
            gateway_request_id = self.gateway_request_id.as_deref(),
            source = %self.source,
            operation = self.operation.as_deref(),
            principal = self.principal_id.as_deref(),
        )
    }

    /// First eight characters of the request id.
    #[must_use]
    pub fn short_id(&self) -> String {
        self.request_id.simple().to_string().chars().take(8).collect()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new("unknown")
    }
}
