//! Verified token claims.

use capgate_capabilities::{CapabilityMetadata, CapabilityResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `aud` claim, which may be a single string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// One audience.
    Single(String),
    /// Several audiences.
    Multiple(Vec<String>),
}

impl Audience {
    /// Whether `audience` is among the listed audiences.
    #[must_use]
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Self::Single(aud) => aud == audience,
            Self::Multiple(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

/// Claims of a token that passed verification.
///
/// Only obtainable from [`crate::TokenVerifier`]; there is no public
/// constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Claims {
    /// Subject: the principal.
    pub sub: String,
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Issued at, seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Not before, seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Authorized party.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,
    /// Identity provider session id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    /// Client-writable metadata carrying capabilities. Opaque to verification.
    #[serde(
        rename = "unsafeMetadata",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub unsafe_metadata: Option<Value>,
}

impl Claims {
    /// The principal id.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// The raw metadata claim, if present.
    #[must_use]
    pub fn unsafe_metadata(&self) -> Option<&Value> {
        self.unsafe_metadata.as_ref()
    }

    /// Interpret the metadata claim as capability metadata.
    ///
    /// # Errors
    ///
    /// Returns a capability error if the claim is present but not an object
    /// of the expected shape.
    pub fn capability_metadata(&self) -> CapabilityResult<Option<CapabilityMetadata>> {
        match &self.unsafe_metadata {
            Some(value) => CapabilityMetadata::from_value(value),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Claims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_audience_single_or_list() {
        let single = claims(json!({ "sub": "u", "exp": 1, "aud": "api" }));
        let multiple = claims(json!({ "sub": "u", "exp": 1, "aud": ["web", "api"] }));

        assert!(single.aud.as_ref().unwrap().contains("api"));
        assert!(multiple.aud.as_ref().unwrap().contains("api"));
        assert!(!multiple.aud.as_ref().unwrap().contains("admin"));
    }

    #[test]
    fn test_metadata_claim_name() {
        let c = claims(json!({
            "sub": "user_1",
            "exp": 1,
            "unsafeMetadata": { "capabilities": { "eap": "2030-01-01T00:00:00Z" } }
        }));

        assert_eq!(c.subject(), "user_1");
        let metadata = c.capability_metadata().unwrap().unwrap();
        assert_eq!(metadata.capabilities.len(), 1);

        let round_trip = serde_json::to_value(&c).unwrap();
        assert!(round_trip.get("unsafeMetadata").is_some());
    }

    #[test]
    fn test_absent_metadata() {
        let c = claims(json!({ "sub": "user_1", "exp": 1 }));
        assert!(c.unsafe_metadata().is_none());
        assert!(c.capability_metadata().unwrap().is_none());
    }

    #[test]
    fn test_missing_subject_rejected() {
        assert!(serde_json::from_value::<Claims>(json!({ "exp": 1 })).is_err());
    }
}
