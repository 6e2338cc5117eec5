//! Configuration struct definitions.
//!
//! Every section is `#[serde(default)]` so partial files and an empty
//! environment both deserialize; required values are enforced afterwards by
//! [`crate::validate`].

use serde::{Deserialize, Serialize};

/// Well-known path of the key set below the issuer.
const JWKS_PATH: &str = "/.well-known/jwks.json";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Token verification settings.
    pub auth: AuthConfig,
    /// Signing key cache settings.
    pub keys: KeyCacheConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Token verification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Expected `aud` claim.
    pub audience: String,
    /// Expected `iss` claim. The key set URL is derived from it.
    pub issuer: String,
    /// Explicit key set URL, overriding the issuer-derived one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks_uri: Option<String>,
    /// Accepted signature algorithms.
    pub algorithms: Vec<String>,
    /// Clock skew tolerance applied to `exp` and `nbf`, in seconds.
    pub leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            audience: String::new(),
            issuer: String::new(),
            jwks_uri: None,
            algorithms: vec!["RS256".to_string()],
            leeway_secs: 0,
        }
    }
}

impl AuthConfig {
    /// The key set URL: the explicit override, else `<issuer>/.well-known/jwks.json`.
    #[must_use]
    pub fn key_set_url(&self) -> String {
        match &self.jwks_uri {
            Some(uri) if !uri.trim().is_empty() => uri.clone(),
            _ => format!("{}{JWKS_PATH}", self.issuer.trim_end_matches('/')),
        }
    }
}

/// Signing key cache and key set fetch settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyCacheConfig {
    /// Maximum number of cached keys.
    pub max_entries: usize,
    /// Maximum age of a cached key, in seconds.
    pub max_age_secs: u64,
    /// Key set fetches allowed per rolling minute.
    pub requests_per_minute: u32,
    /// Key set fetch timeout, in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for KeyCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 5,
            max_age_secs: 600,
            requests_per_minute: 10,
            fetch_timeout_secs: 10,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level filter (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Output format (`pretty`, `compact`, `json`, `full`).
    pub format: String,
    /// Extra filter directives, e.g. `capgate_crypto=debug`.
    pub directives: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
            directives: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_set_url_derived_from_issuer() {
        let auth = AuthConfig {
            issuer: "https://clerk.example.dev/".to_string(),
            ..AuthConfig::default()
        };
        assert_eq!(
            auth.key_set_url(),
            "https://clerk.example.dev/.well-known/jwks.json"
        );
    }

    #[test]
    fn test_key_set_url_override() {
        let auth = AuthConfig {
            issuer: "https://clerk.example.dev".to_string(),
            jwks_uri: Some("https://keys.example.dev/jwks".to_string()),
            ..AuthConfig::default()
        };
        assert_eq!(auth.key_set_url(), "https://keys.example.dev/jwks");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [auth]
            audience = "api"
            "#,
        )
        .unwrap();
        assert_eq!(config.auth.audience, "api");
        assert_eq!(config.auth.algorithms, vec!["RS256"]);
        assert_eq!(config.keys, KeyCacheConfig::default());
        assert_eq!(config.logging.level, "info");
    }
}
