//! Capability-gated read endpoints.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::endpoint::Endpoint;
use crate::error::HandlerResult;
use crate::guard::CapabilityGuard;
use crate::request::ProxyRequest;
use crate::response::HandlerResponse;

/// Capability required by the early-access endpoints.
pub const EARLY_ACCESS: &str = "eap";

/// Returns a resource only early-access principals may read.
#[derive(Debug, Clone)]
pub struct GetThing {
    guard: CapabilityGuard,
}

impl Default for GetThing {
    fn default() -> Self {
        Self::new()
    }
}

impl GetThing {
    /// Requires [`EARLY_ACCESS`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            guard: CapabilityGuard::new(EARLY_ACCESS),
        }
    }
}

#[async_trait]
impl Endpoint for GetThing {
    fn name(&self) -> &'static str {
        "get-thing"
    }

    async fn call(&self, request: &ProxyRequest, now: DateTime<Utc>) -> HandlerResult<HandlerResponse> {
        let admitted = self.guard.admit(request, now)?;
        HandlerResponse::json(
            200,
            &json!({
                "data": format!(
                    "fetched with {} capability by {}",
                    self.guard.capability(),
                    admitted.principal_id
                )
            }),
        )
    }
}

/// Echoes the caller's capabilities as seen through the token.
#[derive(Debug, Clone)]
pub struct GetCapabilities {
    guard: CapabilityGuard,
}

impl Default for GetCapabilities {
    fn default() -> Self {
        Self::new()
    }
}

impl GetCapabilities {
    /// Requires [`EARLY_ACCESS`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            guard: CapabilityGuard::new(EARLY_ACCESS),
        }
    }
}

#[async_trait]
impl Endpoint for GetCapabilities {
    fn name(&self) -> &'static str {
        "get-capabilities"
    }

    async fn call(&self, request: &ProxyRequest, now: DateTime<Utc>) -> HandlerResult<HandlerResponse> {
        let admitted = self.guard.admit(request, now)?;
        HandlerResponse::json(
            200,
            &json!({
                "message": format!(
                    "{} has access to these capabilities in api requests. \
                     Capabilities are extracted from the token's unsafeMetadata claim",
                    admitted.principal_id
                ),
                "capabilities": admitted.metadata.capabilities,
            }),
        )
    }
}
