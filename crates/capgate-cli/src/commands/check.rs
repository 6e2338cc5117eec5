//! `capgate check`: evaluate a capability against a propagated context.

use std::process::ExitCode;

use anyhow::{Context, Result};
use capgate_capabilities::{CapabilityMetadata, CapabilityStatus};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Evaluate `capability` in `context` at `at` (RFC 3339) or now.
pub(crate) fn evaluate(context: &str, capability: &str, at: Option<&str>) -> Result<CapabilityStatus> {
    let now = match at {
        Some(at) => DateTime::parse_from_rfc3339(at)
            .with_context(|| format!("invalid --at timestamp '{at}'"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let metadata = CapabilityMetadata::parse_context(context)?.unwrap_or_default();
    debug!(
        capability,
        %now,
        entries = metadata.capabilities.len(),
        "evaluating capability"
    );
    Ok(metadata.capabilities.evaluate(capability, now))
}

/// Print the status; exit non-zero unless granted.
pub(crate) fn run_check(context: &str, capability: &str, at: Option<&str>) -> Result<ExitCode> {
    let status = evaluate(context, capability, at)?;
    println!("{capability}: {status}");
    Ok(if status.is_granted() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXT: &str = r#"{"capabilities":{"eap":"2030-01-01T00:00:00Z"}}"#;

    #[test]
    fn test_granted_before_expiry() {
        let status = evaluate(CONTEXT, "eap", Some("2029-12-31T23:59:59Z")).unwrap();
        assert!(status.is_granted());
    }

    #[test]
    fn test_expired_at_boundary() {
        let status = evaluate(CONTEXT, "eap", Some("2030-01-01T00:00:00Z")).unwrap();
        assert!(matches!(status, CapabilityStatus::Expired { .. }));
    }

    #[test]
    fn test_absent_and_empty_context() {
        assert_eq!(evaluate(CONTEXT, "pro", None).unwrap(), CapabilityStatus::Absent);
        assert_eq!(evaluate("", "eap", None).unwrap(), CapabilityStatus::Absent);
    }

    #[test]
    fn test_bad_inputs() {
        assert!(evaluate("{oops", "eap", None).is_err());
        assert!(evaluate(CONTEXT, "eap", Some("tomorrow")).is_err());
    }

    #[test]
    fn test_run_check_exit_status() {
        assert_eq!(
            run_check(CONTEXT, "eap", Some("2029-12-31T23:59:59Z")).unwrap(),
            ExitCode::SUCCESS
        );
        assert_eq!(
            run_check(CONTEXT, "eap", Some("2030-06-01T00:00:00Z")).unwrap(),
            ExitCode::FAILURE
        );
    }
}
