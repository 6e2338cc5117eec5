//! Shared harness for end-to-end tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use capgate_authorizer::{AuthorizationDecision, Authorizer, GatewayBoundary, TokenVerifier};
use capgate_capabilities::CapabilityMap;
use capgate_crypto::testing::StaticKeySetSource;
use capgate_crypto::{KeyResolver, ResolverConfig};
use capgate_handlers::{
    HandlerError, HandlerResult, IdentityProvider, LicenseService, LicenseStatus, ProxyRequest,
};
use capgate_test::{TEST_AUDIENCE, TEST_ISSUER, TEST_KID, test_key_set};
use serde_json::Value;

/// Key source, resolver and boundary wired the way a deployment wires them.
#[allow(dead_code)]
pub struct AuthorizerHarness {
    /// In-memory key set endpoint.
    pub source: Arc<StaticKeySetSource>,
    /// The shared resolver.
    pub resolver: Arc<KeyResolver>,
    /// The gateway entry point.
    pub boundary: GatewayBoundary,
}

#[allow(dead_code)]
impl AuthorizerHarness {
    /// Publish `TEST_KID` with default resolver settings.
    pub fn new() -> Self {
        Self::with_source(StaticKeySetSource::new(test_key_set(&[TEST_KID])), ResolverConfig::default())
    }

    /// Use an explicit source and resolver configuration.
    pub fn with_source(source: StaticKeySetSource, config: ResolverConfig) -> Self {
        let source = Arc::new(source);
        let resolver = Arc::new(KeyResolver::new(source.clone(), config));
        let verifier = TokenVerifier::new(Arc::clone(&resolver), TEST_AUDIENCE, TEST_ISSUER);
        Self {
            source,
            resolver,
            boundary: GatewayBoundary::new(Authorizer::new(verifier)),
        }
    }

    /// The verifier behind the boundary.
    pub fn verifier(&self) -> &TokenVerifier {
        self.boundary.authorizer().verifier()
    }

    /// Answer `event`.
    pub async fn handle(&self, event: Value) -> Option<AuthorizationDecision> {
        self.boundary.handle(event).await.ok()
    }
}

/// The request a downstream handler receives after `decision`.
#[allow(dead_code)]
pub fn proxied(decision: &AuthorizationDecision) -> ProxyRequest {
    ProxyRequest::authorized(
        decision.principal_id.clone(),
        decision.context.unsafe_metadata.clone(),
    )
}

/// License service holding one plan's capabilities per grantee.
#[derive(Default)]
#[allow(dead_code)]
pub struct InMemoryLicenses {
    /// Capabilities granted by the default plan.
    pub plan: CapabilityMap,
    /// Current licenses.
    pub licensed: Mutex<HashMap<String, CapabilityMap>>,
}

#[allow(dead_code)]
impl InMemoryLicenses {
    /// A service whose default plan grants `plan`.
    pub fn with_plan(plan: CapabilityMap) -> Self {
        Self {
            plan,
            licensed: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl LicenseService for InMemoryLicenses {
    async fn check(&self, grantee_id: &str) -> HandlerResult<LicenseStatus> {
        let licensed = self
            .licensed
            .lock()
            .map_err(|e| HandlerError::Internal(e.to_string()))?;
        Ok(licensed
            .get(grantee_id)
            .cloned()
            .map_or(LicenseStatus::NoLicense, LicenseStatus::Licensed))
    }

    async fn purchase_default_plan(&self, grantee_id: &str) -> HandlerResult<()> {
        self.licensed
            .lock()
            .map_err(|e| HandlerError::Internal(e.to_string()))?
            .insert(grantee_id.to_string(), self.plan.clone());
        Ok(())
    }
}

/// Identity provider storing each user's capability metadata.
#[derive(Default)]
#[allow(dead_code)]
pub struct InMemoryIdentity {
    /// Stored capabilities per user.
    pub capabilities: Mutex<HashMap<String, CapabilityMap>>,
}

#[allow(dead_code)]
impl InMemoryIdentity {
    /// The `unsafeMetadata` claim the provider would put in `user_id`'s next
    /// token, as name/expiry pairs.
    pub fn token_capabilities(&self, user_id: &str) -> Vec<(String, String)> {
        self.capabilities
            .lock()
            .unwrap()
            .get(user_id)
            .map(|caps| {
                caps.iter()
                    .map(|(name, expiry)| (name.to_string(), expiry.to_rfc3339()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentity {
    async fn set_capabilities(&self, user_id: &str, capabilities: &CapabilityMap) -> HandlerResult<()> {
        self.capabilities
            .lock()
            .map_err(|e| HandlerError::Internal(e.to_string()))?
            .insert(user_id.to_string(), capabilities.clone());
        Ok(())
    }
}
