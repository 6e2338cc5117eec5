//! Prelude module - commonly used types for convenient import.
//!
//! Use `use capgate_handlers::prelude::*;` to import all essential types.

// Errors
pub use crate::{HandlerError, HandlerResult};

// Request and response
pub use crate::{HandlerResponse, ProxyRequest};

// Admission
pub use crate::CapabilityGuard;

// Endpoints
pub use crate::{Endpoint, GetCapabilities, GetThing, LicenseCheck, PostSignUp, respond};

// External services
pub use crate::{IdentityProvider, LicenseService, LicenseStatus, LicenseSync};
