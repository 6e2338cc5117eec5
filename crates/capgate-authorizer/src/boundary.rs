//! The gateway-facing entry point.
//!
//! The gateway only understands "a policy" or "Unauthorized", so every
//! failure is collapsed here. The specific reason is logged and dropped.

use capgate_telemetry::RequestContext;
use serde_json::Value;
use thiserror::Error;
use tracing::{Instrument, info, warn};

use crate::authorize::Authorizer;
use crate::decision::AuthorizationDecision;
use crate::error::AuthResult;
use crate::event::AuthorizerEvent;

/// Opaque refusal returned to the gateway. Carries no detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unauthorized")]
pub struct Unauthorized;

/// Validates raw gateway events and answers them.
#[derive(Debug, Clone)]
pub struct GatewayBoundary {
    authorizer: Authorizer,
}

impl GatewayBoundary {
    /// Wrap `authorizer`.
    #[must_use]
    pub fn new(authorizer: Authorizer) -> Self {
        Self { authorizer }
    }

    /// The wrapped authorizer.
    #[must_use]
    pub fn authorizer(&self) -> &Authorizer {
        &self.authorizer
    }

    /// Answer one raw authorizer event.
    ///
    /// # Errors
    ///
    /// Returns [`Unauthorized`] for any malformed event or failed
    /// verification.
    pub async fn handle(&self, event: Value) -> Result<AuthorizationDecision, Unauthorized> {
        let ctx = RequestContext::new("authorizer").with_operation("authorize");
        let span = ctx.span();

        async {
            match self.decide(event).await {
                Ok(decision) => {
                    tracing::Span::current().record("principal", decision.principal_id.as_str());
                    info!(elapsed_ms = ctx.elapsed_ms(), "request allowed");
                    Ok(decision)
                },
                Err(err) => {
                    warn!(
                        kind = err.kind(),
                        error = %err,
                        elapsed_ms = ctx.elapsed_ms(),
                        "request refused"
                    );
                    Err(Unauthorized)
                },
            }
        }
        .instrument(span)
        .await
    }

    async fn decide(&self, event: Value) -> AuthResult<AuthorizationDecision> {
        let event = AuthorizerEvent::from_value(event)?;
        self.authorizer.authorize(&event).await
    }
}
