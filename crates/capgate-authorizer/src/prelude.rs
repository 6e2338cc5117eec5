//! Prelude module - commonly used types for convenient import.
//!
//! Use `use capgate_authorizer::prelude::*;` to import all essential types.

// Errors
pub use crate::{AuthError, AuthResult};

// Verification
pub use crate::{Claims, TokenVerifier};

// Decisions
pub use crate::{AuthorizationDecision, Authorizer, AuthorizerEvent, Effect};

// Gateway entry point
pub use crate::{GatewayBoundary, Unauthorized};
