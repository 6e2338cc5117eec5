//! Post-merge configuration validation.
//!
//! Validates that deserialized [`Config`](crate::Config) values are present,
//! within acceptable ranges, and that cross-field invariants hold.

use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Signature algorithms a public key set can verify.
const ASYMMETRIC_ALGORITHMS: &[&str] = &[
    "RS256", "RS384", "RS512", "PS256", "PS384", "PS512", "ES256", "ES384", "EdDSA",
];

/// Maximum accepted key set fetch timeout (5 minutes).
const MAX_FETCH_TIMEOUT_SECS: u64 = 300;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_auth(config)?;
    validate_keys(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_auth(config: &Config) -> ConfigResult<()> {
    let a = &config.auth;

    if a.audience.trim().is_empty() {
        return Err(invalid("auth.audience", "audience must be set (env AUDIENCE)"));
    }

    if a.issuer.trim().is_empty() {
        return Err(invalid("auth.issuer", "issuer must be set (env ISSUER)"));
    }

    let key_set_url = a.key_set_url();
    let parsed = Url::parse(&key_set_url)
        .map_err(|e| invalid("auth.jwks_uri", format!("invalid key set URL '{key_set_url}': {e}")))?;
    if !matches!(parsed.scheme(), "https" | "http") {
        return Err(invalid(
            "auth.jwks_uri",
            format!("unsupported scheme '{}'; expected https", parsed.scheme()),
        ));
    }

    if a.algorithms.is_empty() {
        return Err(invalid("auth.algorithms", "at least one algorithm is required"));
    }
    for alg in &a.algorithms {
        if !ASYMMETRIC_ALGORITHMS.contains(&alg.as_str()) {
            return Err(invalid(
                "auth.algorithms",
                format!(
                    "unsupported algorithm '{alg}'; expected one of: {}",
                    ASYMMETRIC_ALGORITHMS.join(", ")
                ),
            ));
        }
    }

    Ok(())
}

fn validate_keys(config: &Config) -> ConfigResult<()> {
    let k = &config.keys;

    if k.max_entries == 0 {
        return Err(invalid("keys.max_entries", "max_entries must be at least 1"));
    }
    if k.max_age_secs == 0 {
        return Err(invalid("keys.max_age_secs", "max_age_secs must be at least 1"));
    }
    if k.requests_per_minute == 0 {
        return Err(invalid(
            "keys.requests_per_minute",
            "requests_per_minute must be at least 1",
        ));
    }
    if k.fetch_timeout_secs == 0 || k.fetch_timeout_secs > MAX_FETCH_TIMEOUT_SECS {
        return Err(invalid(
            "keys.fetch_timeout_secs",
            format!("fetch_timeout_secs must be between 1 and {MAX_FETCH_TIMEOUT_SECS}"),
        ));
    }

    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;

    if !matches!(
        l.level.to_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        return Err(invalid(
            "logging.level",
            format!(
                "unknown log level '{}'; expected one of: trace, debug, info, warn, error",
                l.level
            ),
        ));
    }

    if !matches!(l.format.as_str(), "pretty" | "compact" | "json" | "full") {
        return Err(invalid(
            "logging.format",
            format!(
                "unknown log format '{}'; expected one of: pretty, compact, json, full",
                l.format
            ),
        ));
    }

    Ok(())
}
