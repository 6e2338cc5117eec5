//! Prelude module - commonly used types for convenient import.
//!
//! Use `use capgate_telemetry::prelude::*;` to import all essential types.

// Errors
pub use crate::{TelemetryError, TelemetryResult};

// Logging configuration
pub use crate::{LogConfig, LogFormat};

// Setup
pub use crate::setup_logging;

// Request context
pub use crate::RequestContext;
