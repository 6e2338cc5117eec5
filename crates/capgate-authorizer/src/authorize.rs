//! The authorization decision function.

use std::sync::Arc;
use std::time::Duration;

use capgate_capabilities::encode_context;
use capgate_config::Config;
use capgate_crypto::{HttpKeySetSource, KeyResolver, ResolverConfig};
use tracing::{debug, info};

use crate::decision::{AuthorizationDecision, WILDCARD_RESOURCE};
use crate::error::AuthResult;
use crate::event::AuthorizerEvent;
use crate::verifier::TokenVerifier;

/// Turns verified tokens into gateway decisions.
#[derive(Debug, Clone)]
pub struct Authorizer {
    verifier: TokenVerifier,
}

impl Authorizer {
    /// Create an authorizer around `verifier`.
    #[must_use]
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    /// Build the authorizer, its key resolver and HTTP key source from a
    /// validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`](crate::AuthError) if the key source or the
    /// verifier cannot be configured.
    pub fn from_config(config: &Config) -> AuthResult<Self> {
        let url = config.auth.key_set_url();
        let source = HttpKeySetSource::with_timeout(
            &url,
            Duration::from_secs(config.keys.fetch_timeout_secs),
        )?;
        let resolver = KeyResolver::new(
            Arc::new(source),
            ResolverConfig {
                max_entries: config.keys.max_entries,
                max_age: Duration::from_secs(config.keys.max_age_secs),
                requests_per_minute: config.keys.requests_per_minute,
            },
        );
        let verifier = TokenVerifier::from_config(&config.auth, Arc::new(resolver))?;

        info!(
            key_set = %url,
            audience = verifier.audience(),
            issuer = verifier.issuer(),
            "authorizer configured"
        );
        Ok(Self::new(verifier))
    }

    /// The token verifier.
    #[must_use]
    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Decide admission for `event`.
    ///
    /// The decision allows the verified subject on every method and carries
    /// the token's metadata claim as the propagated context.
    ///
    /// # Errors
    ///
    /// Propagates every verification error unchanged.
    pub async fn authorize(&self, event: &AuthorizerEvent) -> AuthResult<AuthorizationDecision> {
        let claims = self.verifier.verify(event.authorization_token()).await?;

        let context = encode_context(claims.unsafe_metadata());
        debug!(
            sub = %claims.sub,
            method = event.method_arn(),
            has_metadata = !context.is_empty(),
            "allowing request"
        );

        Ok(AuthorizationDecision::allow(
            claims.sub,
            WILDCARD_RESOURCE,
            context,
        ))
    }
}
