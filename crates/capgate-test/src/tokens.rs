//! Token minting helpers.

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Map, Value, json};

use crate::keys::{OTHER_PRIVATE_KEY, TEST_KID, TEST_PRIVATE_KEY};

/// Issuer used by test tokens.
pub const TEST_ISSUER: &str = "https://clerk.capgate.test";

/// Audience used by test tokens.
pub const TEST_AUDIENCE: &str = "https://api.capgate.test";

/// Subject used by test tokens.
pub const TEST_SUBJECT: &str = "user_2aXb9TestSubject";

/// Builder for signed test tokens.
///
/// Defaults to a token that verifies against [`crate::test_key_set`] with
/// [`TEST_ISSUER`] and [`TEST_AUDIENCE`], expiring ten minutes from now.
#[derive(Debug, Clone)]
pub struct TestToken {
    kid: Option<String>,
    algorithm: Algorithm,
    private_key: &'static str,
    claims: Map<String, Value>,
}

impl Default for TestToken {
    fn default() -> Self {
        Self::new()
    }
}

impl TestToken {
    /// A valid token for [`TEST_SUBJECT`].
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now().timestamp();
        let mut claims = Map::new();
        claims.insert("sub".to_string(), json!(TEST_SUBJECT));
        claims.insert("iss".to_string(), json!(TEST_ISSUER));
        claims.insert("aud".to_string(), json!(TEST_AUDIENCE));
        claims.insert("iat".to_string(), json!(now));
        claims.insert("exp".to_string(), json!(now.saturating_add(600)));
        Self {
            kid: Some(TEST_KID.to_string()),
            algorithm: Algorithm::RS256,
            private_key: TEST_PRIVATE_KEY,
            claims,
        }
    }

    /// Set the header key id.
    #[must_use]
    pub fn kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    /// Omit the header key id.
    #[must_use]
    pub fn without_kid(mut self) -> Self {
        self.kid = None;
        self
    }

    /// Sign with `algorithm` instead of RS256. Must be an RSA algorithm.
    #[must_use]
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sign with a key that is not the published one.
    #[must_use]
    pub fn signed_by_other_key(mut self) -> Self {
        self.private_key = OTHER_PRIVATE_KEY;
        self
    }

    /// Set the `sub` claim.
    #[must_use]
    pub fn subject(self, sub: impl Into<String>) -> Self {
        self.claim("sub", Value::String(sub.into()))
    }

    /// Set the `iss` claim.
    #[must_use]
    pub fn issuer(self, iss: impl Into<String>) -> Self {
        self.claim("iss", Value::String(iss.into()))
    }

    /// Set the `aud` claim.
    #[must_use]
    pub fn audience(self, aud: impl Into<String>) -> Self {
        self.claim("aud", Value::String(aud.into()))
    }

    /// Set `exp` relative to now (negative values produce expired tokens).
    #[must_use]
    pub fn expires_in(self, secs: i64) -> Self {
        let exp = Utc::now().timestamp().saturating_add(secs);
        self.claim("exp", json!(exp))
    }

    /// Set `nbf` relative to now.
    #[must_use]
    pub fn not_before_in(self, secs: i64) -> Self {
        let nbf = Utc::now().timestamp().saturating_add(secs);
        self.claim("nbf", json!(nbf))
    }

    /// Attach `unsafeMetadata.capabilities` with the given name/expiry pairs.
    #[must_use]
    pub fn capabilities(self, capabilities: &[(&str, &str)]) -> Self {
        let map: Map<String, Value> = capabilities
            .iter()
            .map(|(name, expiry)| ((*name).to_string(), json!(expiry)))
            .collect();
        self.claim("unsafeMetadata", json!({ "capabilities": map }))
    }

    /// Set or replace an arbitrary claim.
    #[must_use]
    pub fn claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    /// Remove a claim.
    #[must_use]
    pub fn without_claim(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    /// Encode and sign the token.
    ///
    /// # Panics
    ///
    /// Panics if the embedded test key cannot be parsed.
    #[must_use]
    pub fn mint(&self) -> String {
        let mut header = Header::new(self.algorithm);
        header.kid.clone_from(&self.kid);
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .expect("test private key parses");
        jsonwebtoken::encode(&header, &Value::Object(self.claims.clone()), &key)
            .expect("test token encodes")
    }

    /// The minted token as an `Authorization` header value.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.mint())
    }
}

/// A gateway `TOKEN` authorizer event carrying `authorization_token`.
#[must_use]
pub fn token_event(authorization_token: &str) -> Value {
    json!({
        "type": "TOKEN",
        "authorizationToken": authorization_token,
        "methodArn": "arn:aws:execute-api:eu-west-2:123456789012:abcdef1234/dev/GET/thing",
    })
}
