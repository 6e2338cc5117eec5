//! Capability admission for downstream handlers.

use capgate_capabilities::{CapabilityMetadata, CapabilityStatus};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{HandlerError, HandlerResult};
use crate::request::ProxyRequest;

/// A principal admitted by a [`CapabilityGuard`].
#[derive(Debug, Clone, PartialEq)]
pub struct Admitted {
    /// The authenticated principal.
    pub principal_id: String,
    /// The principal's capability metadata.
    pub metadata: CapabilityMetadata,
}

/// Return the authenticated principal of `request`.
///
/// # Errors
///
/// Returns [`HandlerError::NotAuthenticated`] if the request carries no
/// authorizer context or no principal.
pub fn authenticate(request: &ProxyRequest) -> HandlerResult<&str> {
    if request.authorizer().is_none() {
        return Err(HandlerError::NotAuthenticated(
            "no authorizer context".to_string(),
        ));
    }
    request
        .principal_id()
        .ok_or_else(|| HandlerError::NotAuthenticated("no principal id".to_string()))
}

/// Admits requests whose principal holds one unexpired capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityGuard {
    capability: String,
}

impl CapabilityGuard {
    /// A guard requiring `capability`.
    #[must_use]
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
        }
    }

    /// The required capability.
    #[must_use]
    pub fn capability(&self) -> &str {
        &self.capability
    }

    /// Admit `request` at instant `now`.
    ///
    /// # Errors
    ///
    /// - [`HandlerError::NotAuthenticated`] if there is no authorizer
    ///   context, no principal, or the propagated context does not parse
    ///   (including a `capabilities` member that is not an object).
    /// - [`HandlerError::NotAuthorised`] if the capability is absent or
    ///   expired at `now`.
    pub fn admit(&self, request: &ProxyRequest, now: DateTime<Utc>) -> HandlerResult<Admitted> {
        let principal_id = authenticate(request)?;

        let context = request
            .authorizer()
            .and_then(|authorizer| authorizer.unsafe_metadata.as_deref())
            .unwrap_or_default();
        let metadata = CapabilityMetadata::parse_context(context)
            .map_err(|e| HandlerError::NotAuthenticated(e.to_string()))?
            .unwrap_or_default();

        let status = metadata.capabilities.evaluate(&self.capability, now);
        debug!(principal = principal_id, capability = %self.capability, %status, "capability check");

        match status {
            CapabilityStatus::Granted { .. } => Ok(Admitted {
                principal_id: principal_id.to_string(),
                metadata,
            }),
            CapabilityStatus::Expired { .. } | CapabilityStatus::Absent => {
                Err(HandlerError::NotAuthorised {
                    capability: self.capability.clone(),
                    reason: status.to_string(),
                })
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{AuthorizerContext, GatewayContext};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn guard() -> CapabilityGuard {
        CapabilityGuard::new("eap")
    }

    #[test]
    fn test_granted_capability_admits() {
        let request = ProxyRequest::authorized(
            "user_1",
            r#"{"capabilities":{"eap":"2030-01-01T00:00:00Z"}}"#,
        );
        let admitted = guard().admit(&request, now()).unwrap();
        assert_eq!(admitted.principal_id, "user_1");
        assert_eq!(admitted.metadata.capabilities.len(), 1);
    }

    #[test]
    fn test_missing_authorizer_is_401() {
        let err = guard().admit(&ProxyRequest::default(), now()).unwrap_err();
        assert_eq!(err.status(), 401);
    }

    #[test]
    fn test_missing_principal_is_401() {
        let request = ProxyRequest {
            request_context: GatewayContext {
                authorizer: Some(AuthorizerContext {
                    principal_id: None,
                    unsafe_metadata: Some(r#"{"capabilities":{"eap":"2030-01-01T00:00:00Z"}}"#.into()),
                }),
                ..GatewayContext::default()
            },
            ..ProxyRequest::default()
        };
        assert_eq!(guard().admit(&request, now()).unwrap_err().status(), 401);
    }

    #[test]
    fn test_unparseable_context_is_401() {
        let request = ProxyRequest::authorized("user_1", "{not json");
        assert_eq!(guard().admit(&request, now()).unwrap_err().status(), 401);
    }

    #[test]
    fn test_null_capabilities_is_401() {
        let request = ProxyRequest::authorized("user_1", r#"{"capabilities":null}"#);
        let err = guard().admit(&request, now()).unwrap_err();
        assert!(matches!(err, HandlerError::NotAuthenticated(_)));
        assert_eq!(err.code(), "NOT_AUTHENTICATED");
    }

    #[test]
    fn test_empty_context_is_403() {
        let request = ProxyRequest::authorized("user_1", "");
        let err = guard().admit(&request, now()).unwrap_err();
        assert_eq!(err.status(), 403);
        assert!(matches!(err, HandlerError::NotAuthorised { reason, .. } if reason == "absent"));
    }

    #[test]
    fn test_expired_capability_is_403() {
        let request = ProxyRequest::authorized(
            "user_1",
            r#"{"capabilities":{"eap":"2020-01-01T00:00:00Z"}}"#,
        );
        let err = guard().admit(&request, now()).unwrap_err();
        assert_eq!(err.status(), 403);
        assert!(matches!(err, HandlerError::NotAuthorised { reason, .. } if reason.starts_with("expired")));
    }

    #[test]
    fn test_other_capability_does_not_admit() {
        let request = ProxyRequest::authorized(
            "user_1",
            r#"{"capabilities":{"pro":"2030-01-01T00:00:00Z"}}"#,
        );
        assert_eq!(guard().admit(&request, now()).unwrap_err().status(), 403);
    }

    #[test]
    fn test_authenticate() {
        assert_eq!(authenticate(&ProxyRequest::authorized("user_1", "")).unwrap(), "user_1");
        assert!(authenticate(&ProxyRequest::default()).is_err());
    }
}
