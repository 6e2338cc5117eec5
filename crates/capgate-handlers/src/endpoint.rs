//! The handler seam and error-to-response conversion.

use async_trait::async_trait;
use capgate_telemetry::RequestContext;
use chrono::{DateTime, Utc};
use tracing::{Instrument, error, info, warn};

use crate::error::{HandlerError, HandlerResult};
use crate::request::ProxyRequest;
use crate::response::HandlerResponse;

/// A downstream handler behind the authorizer.
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// Stable name, used in logs.
    fn name(&self) -> &'static str;

    /// Handle `request` as of instant `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`HandlerError`]; [`respond`] turns it into a response.
    async fn call(&self, request: &ProxyRequest, now: DateTime<Utc>) -> HandlerResult<HandlerResponse>;
}

/// Run `endpoint` and map any error through the status table.
pub async fn respond(endpoint: &dyn Endpoint, request: &ProxyRequest) -> HandlerResponse {
    respond_at(endpoint, request, Utc::now()).await
}

/// [`respond`] with an explicit evaluation instant.
pub async fn respond_at(
    endpoint: &dyn Endpoint,
    request: &ProxyRequest,
    now: DateTime<Utc>,
) -> HandlerResponse {
    let mut ctx = RequestContext::new(endpoint.name());
    if let Some(id) = request.gateway_request_id() {
        ctx = ctx.with_gateway_request_id(id);
    }
    if let Some(principal) = request.principal_id() {
        ctx = ctx.with_principal(principal);
    }
    let span = ctx.span();

    async {
        match endpoint.call(request, now).await {
            Ok(response) => {
                info!(status = response.status_code, elapsed_ms = ctx.elapsed_ms(), "handled");
                response
            },
            Err(err) => {
                log_failure(&err);
                HandlerResponse::from_error(&err)
            },
        }
    }
    .instrument(span)
    .await
}

fn log_failure(err: &HandlerError) {
    match err {
        HandlerError::NotAuthenticated(_) | HandlerError::NotAuthorised { .. } => {
            warn!(status = err.status(), error = %err, "request refused");
        },
        HandlerError::Upstream { .. } | HandlerError::Internal(_) => {
            error!(status = err.status(), error = %err, "request failed");
        },
    }
}
