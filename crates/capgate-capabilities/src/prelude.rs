//! Prelude module - commonly used types for convenient import.
//!
//! Use `use capgate_capabilities::prelude::*;` to import all essential types.

// Errors
pub use crate::{CapabilityError, CapabilityResult};

// Evaluation
pub use crate::{CapabilityMap, CapabilityStatus, has_capability};

// Context propagation
pub use crate::{CapabilityMetadata, encode_context};
