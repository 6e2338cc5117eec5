//! Configuration file loading.
//!
//! Resolution order, highest priority first:
//!
//! 1. The config file, when one is given
//! 2. Environment variables (fallback only, see [`crate::env`])
//! 3. Embedded defaults
//!
//! The merged result is validated before it is returned, so a process that
//! loads its configuration at startup fails fast on missing values.

use std::path::Path;

use tracing::info;

use crate::env::apply_env_fallback;
use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate::validate;

/// Load configuration from an optional file plus the process environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or parsed, an
/// environment value is malformed, or validation fails.
pub fn load(path: Option<&Path>) -> ConfigResult<Config> {
    load_with_env(path, |name| std::env::var(name).ok())
}

/// Load configuration using `lookup` in place of the process environment.
///
/// # Errors
///
/// Same as [`load`].
pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> ConfigResult<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut table = match path {
        Some(path) => read_table(path)?,
        None => toml::Table::new(),
    };

    apply_env_fallback(&mut table, lookup)?;

    let source = path.map_or_else(|| "<environment>".to_string(), |p| p.display().to_string());
    let config: Config = toml::Value::Table(table)
        .try_into()
        .map_err(|e| ConfigError::ParseError {
            path: source.clone(),
            source: e,
        })?;

    validate(&config)?;
    info!(source = %source, issuer = %config.auth.issuer, "configuration loaded");
    Ok(config)
}

/// Load a single file with no environment fallback.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    load_with_env(Some(path), |_| None)
}

fn read_table(path: &Path) -> ConfigResult<toml::Table> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"
[auth]
audience = "https://api.example.dev"
issuer = "https://clerk.example.dev"

[keys]
requests_per_minute = 20
"#;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_file() {
        let file = write_config(VALID);
        let config = load_file(file.path()).unwrap();

        assert_eq!(config.auth.audience, "https://api.example.dev");
        assert_eq!(config.keys.requests_per_minute, 20);
        assert_eq!(config.keys.max_entries, 5);
    }

    #[test]
    fn test_load_from_env_only() {
        let config = load_with_env(None, |name| match name {
            "AUDIENCE" => Some("api".to_string()),
            "ISSUER" => Some("https://issuer.example.dev".to_string()),
            "CAPGATE_LOG_LEVEL" => Some("debug".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.auth.audience, "api");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.auth.key_set_url(),
            "https://issuer.example.dev/.well-known/jwks.json"
        );
    }

    #[test]
    fn test_missing_audience_fails_fast() {
        let err = load_with_env(None, |name| {
            (name == "ISSUER").then(|| "https://issuer.example.dev".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { field, .. } if field == "auth.audience"));
    }

    #[test]
    fn test_missing_issuer_fails_fast() {
        let err =
            load_with_env(None, |name| (name == "AUDIENCE").then(|| "api".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { field, .. } if field == "auth.issuer"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_file(Path::new("/nonexistent/capgate.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_malformed_file() {
        let file = write_config("[auth\naudience = ");
        assert!(matches!(
            load_file(file.path()),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_wrong_field_type() {
        let file = write_config("[keys]\nmax_entries = \"many\"\n");
        assert!(matches!(
            load_file(file.path()),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
