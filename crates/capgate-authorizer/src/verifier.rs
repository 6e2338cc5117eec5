//! Bearer token verification against the published key set.

use std::str::FromStr;
use std::sync::Arc;

use capgate_config::AuthConfig;
use capgate_crypto::KeyResolver;
use jsonwebtoken::{Algorithm, Validation, decode, decode_header};
use tracing::{debug, warn};

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};

/// Authorization scheme accepted in the header value.
const BEARER_SCHEME: &str = "Bearer ";

/// Claims that must be present for a token to be considered at all.
const REQUIRED_CLAIMS: &[&str] = &["exp", "iss", "aud"];

/// Extract the compact token from an `Authorization` header value.
///
/// The scheme is matched exactly (`Bearer`, one space) and the token must be
/// non-empty and free of whitespace.
///
/// # Errors
///
/// Returns [`AuthError::MalformedToken`] otherwise.
pub fn parse_bearer(value: &str) -> AuthResult<&str> {
    let token = value
        .strip_prefix(BEARER_SCHEME)
        .ok_or_else(|| AuthError::MalformedToken("expected 'Bearer <token>'".to_string()))?;

    if token.is_empty() {
        return Err(AuthError::MalformedToken("empty bearer token".to_string()));
    }
    if token.chars().any(char::is_whitespace) {
        return Err(AuthError::MalformedToken(
            "bearer token contains whitespace".to_string(),
        ));
    }
    Ok(token)
}

/// Verifies bearer tokens issued by one identity provider for one audience.
///
/// Constructed once at startup; the expected audience and issuer never
/// change afterwards.
#[derive(Clone)]
pub struct TokenVerifier {
    resolver: Arc<KeyResolver>,
    audience: String,
    issuer: String,
    algorithms: Vec<Algorithm>,
    leeway_secs: u64,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("algorithms", &self.algorithms)
            .field("leeway_secs", &self.leeway_secs)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Create a verifier accepting RS256 with no clock leeway.
    #[must_use]
    pub fn new(
        resolver: Arc<KeyResolver>,
        audience: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            audience: audience.into(),
            issuer: issuer.into(),
            algorithms: vec![Algorithm::RS256],
            leeway_secs: 0,
        }
    }

    /// Create a verifier from the `[auth]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if an algorithm name is unknown
    /// or the list is empty.
    pub fn from_config(config: &AuthConfig, resolver: Arc<KeyResolver>) -> AuthResult<Self> {
        let algorithms = config
            .algorithms
            .iter()
            .map(|name| {
                Algorithm::from_str(name).map_err(|_| {
                    AuthError::Configuration(format!("unknown signature algorithm '{name}'"))
                })
            })
            .collect::<AuthResult<Vec<_>>>()?;

        if algorithms.is_empty() {
            return Err(AuthError::Configuration(
                "no signature algorithms configured".to_string(),
            ));
        }

        Ok(Self::new(resolver, config.audience.clone(), config.issuer.clone())
            .with_algorithms(algorithms)
            .with_leeway(config.leeway_secs))
    }

    /// Replace the accepted signature algorithms.
    #[must_use]
    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    /// Set the clock skew tolerance for `exp` and `nbf`.
    #[must_use]
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    /// Expected audience.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Expected issuer.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// The shared key resolver.
    #[must_use]
    pub fn resolver(&self) -> &Arc<KeyResolver> {
        &self.resolver
    }

    /// Verify an `Authorization` header value against the configured
    /// audience and issuer.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] describing the first check that failed.
    pub async fn verify(&self, bearer: &str) -> AuthResult<Claims> {
        self.verify_with(bearer, &self.audience, &self.issuer).await
    }

    /// Verify an `Authorization` header value against an explicit audience
    /// and issuer.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] describing the first check that failed.
    pub async fn verify_with(&self, bearer: &str, audience: &str, issuer: &str) -> AuthResult<Claims> {
        let token = parse_bearer(bearer)?;

        let header = decode_header(token)
            .map_err(|e| AuthError::MalformedToken(format!("undecodable token header: {e}")))?;
        let kid = header
            .kid
            .as_deref()
            .filter(|kid| !kid.is_empty())
            .ok_or_else(|| AuthError::MalformedToken("token header has no key id".to_string()))?;

        let key = self.resolver.resolve(kid).await?;

        if let Some(declared) = key.algorithm()
            && declared != header.alg
        {
            warn!(kid, ?declared, presented = ?header.alg, "token algorithm differs from key");
            return Err(AuthError::SignatureInvalid);
        }

        let validation = self.validation(audience, issuer);
        let data = decode::<Claims>(token, key.decoding_key(), &validation)?;

        debug!(kid, sub = %data.claims.sub, "token verified");
        Ok(data.claims)
    }

    fn validation(&self, audience: &str, issuer: &str) -> Validation {
        let primary = self.algorithms.first().copied().unwrap_or(Algorithm::RS256);
        let mut validation = Validation::new(primary);
        validation.algorithms.clone_from(&self.algorithms);
        validation.leeway = self.leeway_secs;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_audience(&[audience]);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(REQUIRED_CLAIMS);
        validation
    }
}
