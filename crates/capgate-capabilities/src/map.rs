//! Capability maps and the admission predicate.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Outcome of looking a capability up at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityStatus {
    /// Present and expiring strictly after the evaluation instant.
    Granted {
        /// When the grant lapses.
        expires_at: DateTime<Utc>,
    },
    /// Present but expired at or before the evaluation instant.
    Expired {
        /// When the grant lapsed.
        expired_at: DateTime<Utc>,
    },
    /// Not present in the map.
    Absent,
}

impl CapabilityStatus {
    /// Whether this status admits the request.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }
}

impl std::fmt::Display for CapabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Granted { expires_at } => write!(f, "granted until {}", expires_at.to_rfc3339()),
            Self::Expired { expired_at } => write!(f, "expired at {}", expired_at.to_rfc3339()),
            Self::Absent => write!(f, "absent"),
        }
    }
}

/// Capability name to expiry timestamp.
///
/// Serialized as a JSON object of RFC 3339 strings. Entries whose expiry
/// cannot be parsed are dropped on deserialization (and logged), which makes
/// them indistinguishable from absent capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CapabilityMap(BTreeMap<String, DateTime<Utc>>);

impl CapabilityMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert or replace a capability.
    pub fn insert(&mut self, name: impl Into<String>, expires_at: DateTime<Utc>) {
        self.0.insert(name.into(), expires_at);
    }

    /// Expiry of `name`, if present.
    #[must_use]
    pub fn expiry(&self, name: &str) -> Option<DateTime<Utc>> {
        self.0.get(name).copied()
    }

    /// Look `name` up at instant `now`.
    #[must_use]
    pub fn evaluate(&self, name: &str, now: DateTime<Utc>) -> CapabilityStatus {
        match self.expiry(name) {
            Some(expires_at) if expires_at > now => CapabilityStatus::Granted { expires_at },
            Some(expired_at) => CapabilityStatus::Expired { expired_at },
            None => CapabilityStatus::Absent,
        }
    }

    /// Whether `name` is granted at instant `now`.
    #[must_use]
    pub fn grants(&self, name: &str, now: DateTime<Utc>) -> bool {
        self.evaluate(name, now).is_granted()
    }

    /// Capability names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over `(name, expiry)` pairs, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DateTime<Utc>)> {
        self.0.iter().map(|(name, expiry)| (name.as_str(), *expiry))
    }

    /// Number of capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map holds no capabilities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, DateTime<Utc>)> for CapabilityMap {
    fn from_iter<I: IntoIterator<Item = (S, DateTime<Utc>)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(name, expiry)| (name.into(), expiry)).collect())
    }
}

impl<'de> Deserialize<'de> for CapabilityMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        let mut map = BTreeMap::new();
        for (name, value) in raw {
            let parsed = value
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc));
            match parsed {
                Some(expiry) => {
                    map.insert(name, expiry);
                },
                None => warn!(capability = %name, value = %value, "ignoring capability with unparseable expiry"),
            }
        }
        Ok(Self(map))
    }
}

/// Whether capability `name` is granted by `capabilities` at instant `now`.
///
/// True iff `name` is present and its expiry is strictly after `now`.
#[must_use]
pub fn has_capability(name: &str, capabilities: &CapabilityMap, now: DateTime<Utc>) -> bool {
    capabilities.grants(name, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_map_grants_nothing() {
        let empty = CapabilityMap::new();
        for name in ["eap", "", "pro"] {
            assert!(!has_capability(name, &empty, at(1970, 1, 1)));
            assert!(!has_capability(name, &empty, at(2099, 12, 31)));
        }
    }

    #[test]
    fn test_unexpired_capability_granted() {
        let caps: CapabilityMap = [("eap", at(2030, 1, 1))].into_iter().collect();
        assert!(has_capability("eap", &caps, at(2025, 1, 1)));
    }

    #[test]
    fn test_expiry_boundary_is_strict() {
        let expiry = at(2030, 1, 1);
        let caps: CapabilityMap = [("eap", expiry)].into_iter().collect();

        let before = expiry.checked_sub_signed(Duration::seconds(1)).unwrap();
        let after = expiry.checked_add_signed(Duration::seconds(1)).unwrap();

        assert!(has_capability("eap", &caps, before));
        assert!(!has_capability("eap", &caps, expiry));
        assert!(!has_capability("eap", &caps, after));
    }

    #[test]
    fn test_evaluate_distinguishes_expired_and_absent() {
        let caps: CapabilityMap = [("eap", at(2020, 1, 1))].into_iter().collect();
        let now = at(2025, 1, 1);

        assert_eq!(
            caps.evaluate("eap", now),
            CapabilityStatus::Expired {
                expired_at: at(2020, 1, 1)
            }
        );
        assert_eq!(caps.evaluate("pro", now), CapabilityStatus::Absent);
        assert!(!caps.evaluate("eap", now).is_granted());
    }

    #[test]
    fn test_deserialize_rfc3339_with_fraction_and_offset() {
        let caps: CapabilityMap = serde_json::from_str(
            r#"{"eap":"2030-01-01T00:00:00.000Z","pro":"2030-01-01T02:00:00+02:00"}"#,
        )
        .unwrap();

        assert_eq!(caps.expiry("eap"), Some(at(2030, 1, 1)));
        assert_eq!(caps.expiry("pro"), Some(at(2030, 1, 1)));
    }

    #[test]
    fn test_deserialize_drops_unparseable_entries() {
        let caps: CapabilityMap =
            serde_json::from_str(r#"{"eap":"2030-01-01T00:00:00Z","bad":"soon","num":5}"#).unwrap();

        assert_eq!(caps.names().collect::<Vec<_>>(), vec!["eap"]);
        assert!(!caps.grants("bad", at(2000, 1, 1)));
    }

    #[test]
    fn test_serialize_as_object_of_strings() {
        let caps: CapabilityMap = [("eap", at(2030, 1, 1))].into_iter().collect();
        let json = serde_json::to_string(&caps).unwrap();
        assert_eq!(json, r#"{"eap":"2030-01-01T00:00:00Z"}"#);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(CapabilityStatus::Absent.to_string(), "absent");
        assert!(
            CapabilityStatus::Granted {
                expires_at: at(2030, 1, 1)
            }
            .to_string()
            .starts_with("granted until 2030-01-01")
        );
    }
}
