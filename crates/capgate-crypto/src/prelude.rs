//! Prelude module - commonly used types for convenient import.
//!
//! Use `use capgate_crypto::prelude::*;` to import all essential types.

// Errors
pub use crate::{KeyResolutionError, KeyResult};

// Keys
pub use crate::SigningKey;

// Resolution
pub use crate::{HttpKeySetSource, KeyResolver, KeySetSource, ResolverConfig};
