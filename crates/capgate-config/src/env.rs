//! Environment variable fallback.
//!
//! Env vars are **fallback**, not override: they only fill fields that the
//! config file left unset.

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// How an environment value is typed when inserted into the config tree.
#[derive(Debug, Clone, Copy)]
enum EnvKind {
    Str,
    Int,
}

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    kind: EnvKind,
}

/// All supported environment mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "AUDIENCE",
        field_path: "auth.audience",
        kind: EnvKind::Str,
    },
    EnvMapping {
        var_name: "ISSUER",
        field_path: "auth.issuer",
        kind: EnvKind::Str,
    },
    EnvMapping {
        var_name: "JWKS_URI",
        field_path: "auth.jwks_uri",
        kind: EnvKind::Str,
    },
    EnvMapping {
        var_name: "CAPGATE_LEEWAY_SECS",
        field_path: "auth.leeway_secs",
        kind: EnvKind::Int,
    },
    EnvMapping {
        var_name: "CAPGATE_JWKS_REQUESTS_PER_MINUTE",
        field_path: "keys.requests_per_minute",
        kind: EnvKind::Int,
    },
    EnvMapping {
        var_name: "CAPGATE_JWKS_TIMEOUT_SECS",
        field_path: "keys.fetch_timeout_secs",
        kind: EnvKind::Int,
    },
    EnvMapping {
        var_name: "CAPGATE_LOG_LEVEL",
        field_path: "logging.level",
        kind: EnvKind::Str,
    },
    EnvMapping {
        var_name: "CAPGATE_LOG_FORMAT",
        field_path: "logging.format",
        kind: EnvKind::Str,
    },
];

/// Fill unset fields of `table` from the environment.
///
/// `lookup` returns the value of an environment variable, if set. Empty
/// values are treated as unset.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] if an integer variable does not parse.
pub fn apply_env_fallback<F>(table: &mut toml::Table, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    for mapping in ENV_MAPPINGS {
        let Some(raw) = lookup(mapping.var_name).filter(|v| !v.is_empty()) else {
            continue;
        };

        let (section, field) = mapping
            .field_path
            .split_once('.')
            .unwrap_or(("", mapping.field_path));

        let section_table = table
            .entry(section)
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        let Some(section_table) = section_table.as_table_mut() else {
            continue;
        };

        if section_table.contains_key(field) {
            continue;
        }

        let value = match mapping.kind {
            EnvKind::Str => toml::Value::String(raw),
            EnvKind::Int => {
                let parsed: i64 = raw.trim().parse().map_err(|_| ConfigError::EnvError {
                    var_name: mapping.var_name.to_owned(),
                    message: format!("expected an integer, got '{raw}'"),
                })?;
                toml::Value::Integer(parsed)
            },
        };

        debug!(var = mapping.var_name, field = mapping.field_path, "applying env fallback");
        section_table.insert(field.to_owned(), value);
    }

    Ok(())
}
