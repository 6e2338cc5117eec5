//! `capgate authorize`: answer one authorizer event.

use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use capgate_authorizer::{Authorizer, GatewayBoundary};
use capgate_config::Config;
use serde_json::Value;
use tracing::{debug, info};

/// Read an event from `path`, or from stdin when `None`.
pub(crate) fn read_event(path: Option<&Path>) -> Result<Value> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read event file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read event from stdin")?;
            buf
        },
    };
    serde_json::from_str(&raw).context("event is not valid JSON")
}

/// Print the decision, or `Unauthorized` with a failing exit status.
pub(crate) async fn run_authorize(config: &Config, event: Option<&Path>) -> Result<ExitCode> {
    let event = read_event(event)?;
    debug!(key_set = %config.auth.key_set_url(), "building authorizer");
    let boundary = GatewayBoundary::new(Authorizer::from_config(config)?);

    match boundary.handle(event).await {
        Ok(decision) => {
            info!(principal = %decision.principal_id, "event allowed");
            println!("{}", serde_json::to_string_pretty(&decision)?);
            Ok(ExitCode::SUCCESS)
        },
        Err(unauthorized) => {
            info!("event refused");
            println!("{unauthorized}");
            Ok(ExitCode::FAILURE)
        },
    }
}
