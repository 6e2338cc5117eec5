//! Public signing keys decoded from a JSON Web Key Set.

use std::str::FromStr;

use jsonwebtoken::jwk::{Jwk, PublicKeyUse};
use jsonwebtoken::{Algorithm, DecodingKey};
use serde_json::Value;
use tracing::warn;

use crate::error::{KeyResolutionError, KeyResult};

/// A public key used to verify token signatures.
///
/// Immutable once decoded. Identified by the `kid` published alongside it.
#[derive(Clone)]
pub struct SigningKey {
    kid: String,
    algorithm: Option<Algorithm>,
    decoding_key: DecodingKey,
}

impl SigningKey {
    /// Build a signing key from its parts.
    #[must_use]
    pub fn new(kid: impl Into<String>, algorithm: Option<Algorithm>, decoding_key: DecodingKey) -> Self {
        Self {
            kid: kid.into(),
            algorithm,
            decoding_key,
        }
    }

    /// Decode a single JSON Web Key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyResolutionError::InvalidKeySet`] if the key has no `kid`,
    /// is not a signing key, or its material cannot be decoded.
    pub fn from_jwk_value(value: &Value) -> KeyResult<Self> {
        let declared_alg = value
            .get("alg")
            .and_then(Value::as_str)
            .and_then(|alg| Algorithm::from_str(alg).ok());

        let jwk: Jwk = serde_json::from_value(value.clone())
            .map_err(|e| KeyResolutionError::InvalidKeySet(format!("malformed JWK: {e}")))?;

        let kid = jwk
            .common
            .key_id
            .clone()
            .ok_or_else(|| KeyResolutionError::InvalidKeySet("JWK without kid".to_string()))?;

        if let Some(key_use) = &jwk.common.public_key_use
            && *key_use != PublicKeyUse::Signature
        {
            return Err(KeyResolutionError::InvalidKeySet(format!(
                "JWK {kid} is not a signing key"
            )));
        }

        let decoding_key = DecodingKey::from_jwk(&jwk)
            .map_err(|e| KeyResolutionError::InvalidKeySet(format!("JWK {kid}: {e}")))?;

        Ok(Self::new(kid, declared_alg, decoding_key))
    }

    /// Key identifier.
    #[must_use]
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Algorithm declared by the key set, if any.
    #[must_use]
    pub fn algorithm(&self) -> Option<Algorithm> {
        self.algorithm
    }

    /// Key material for signature verification.
    #[must_use]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Parse a key set document (`{"keys": [...]}`) into usable signing keys.
///
/// Individual keys that are not usable for signature verification are
/// skipped with a warning; a document without a `keys` array is rejected.
///
/// # Errors
///
/// Returns [`KeyResolutionError::InvalidKeySet`] if the document shape is wrong.
pub fn parse_key_set(document: &Value) -> KeyResult<Vec<SigningKey>> {
    let keys = document
        .get("keys")
        .and_then(Value::as_array)
        .ok_or_else(|| KeyResolutionError::InvalidKeySet("missing \"keys\" array".to_string()))?;

    let mut parsed = Vec::with_capacity(keys.len());
    for value in keys {
        match SigningKey::from_jwk_value(value) {
            Ok(key) => parsed.push(key),
            Err(e) => warn!(error = %e, "skipping unusable key set entry"),
        }
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use capgate_test::{TEST_KID, test_jwk, test_key_set};
    use serde_json::json;

    #[test]
    fn test_decode_rsa_jwk() {
        let key = SigningKey::from_jwk_value(&test_jwk(TEST_KID)).unwrap();
        assert_eq!(key.kid(), TEST_KID);
        assert_eq!(key.algorithm(), Some(Algorithm::RS256));
    }

    #[test]
    fn test_jwk_without_kid_rejected() {
        let mut jwk = test_jwk(TEST_KID);
        jwk.as_object_mut().unwrap().remove("kid");
        assert!(matches!(
            SigningKey::from_jwk_value(&jwk),
            Err(KeyResolutionError::InvalidKeySet(_))
        ));
    }

    #[test]
    fn test_encryption_key_rejected() {
        let mut jwk = test_jwk(TEST_KID);
        jwk["use"] = json!("enc");
        assert!(SigningKey::from_jwk_value(&jwk).is_err());
    }

    #[test]
    fn test_parse_key_set_skips_unusable_entries() {
        let mut document = test_key_set(&["k1", "k2"]);
        document["keys"]
            .as_array_mut()
            .unwrap()
            .push(json!({"kty": "RSA", "n": "AQAB"}));

        let keys = parse_key_set(&document).unwrap();
        let kids: Vec<&str> = keys.iter().map(SigningKey::kid).collect();
        assert_eq!(kids, vec!["k1", "k2"]);
    }

    #[test]
    fn test_parse_key_set_requires_keys_array() {
        assert!(parse_key_set(&json!({"jwks": []})).is_err());
        assert!(parse_key_set(&json!({"keys": {}})).is_err());
    }

    #[test]
    fn test_debug_hides_key_material() {
        let key = SigningKey::from_jwk_value(&test_jwk(TEST_KID)).unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains(TEST_KID));
        assert!(!debug.contains("decoding_key"));
    }
}
