//! Configuration for the capgate authorizer and handlers.
//!
//! This crate provides a single [`Config`] type holding the token
//! verification, key cache and logging settings.
//!
//! # Usage
//!
//! ```rust,no_run
//! use capgate_config::Config;
//!
//! // File values first, then AUDIENCE / ISSUER / CAPGATE_* env fallback.
//! let config = Config::load(Some(std::path::Path::new("capgate.toml"))).unwrap();
//! println!("Key set: {}", config.auth.key_set_url());
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **File** (`--config <path>`)
//! 2. **Environment variables** (`AUDIENCE`, `ISSUER`, `JWKS_URI`, `CAPGATE_*`), fallback only
//! 3. **Embedded defaults**
//!
//! Loading always validates, so a missing audience or issuer stops the
//! process at startup rather than at the first request.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use types::*;

impl Config {
    /// Load configuration from an optional file with environment fallback.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is malformed or the final
    /// configuration fails validation.
    pub fn load(path: Option<&std::path::Path>) -> ConfigResult<Self> {
        loader::load(path)
    }

    /// Load configuration from a single file (no environment fallback).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }

    /// Render the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SerializeError`] if rendering fails.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }
}
