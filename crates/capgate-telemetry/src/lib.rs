//! Capgate Telemetry - logging and tracing for the capgate authorizer.
//!
//! This crate provides:
//! - Configurable logging setup with multiple formats
//! - Request context for correlating the events of one authorization
//! - Integration with the tracing ecosystem
//!
//! # Example
//!
//! ```rust,no_run
//! use capgate_telemetry::{LogConfig, LogFormat, setup_logging, RequestContext};
//!
//! # fn main() -> Result<(), capgate_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Json)
//!     .with_directive("capgate_crypto=debug");
//!
//! setup_logging(&config)?;
//!
//! let ctx = RequestContext::new("authorizer").with_operation("authorize");
//! let span = ctx.span();
//! let _guard = span.enter();
//! tracing::info!("Authorizing request");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod context;
mod error;
mod logging;

pub use context::RequestContext;
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, setup_logging};
