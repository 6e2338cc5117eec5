//! Capgate Authorizer - bearer token verification and gateway decisions.
//!
//! This crate provides:
//! - [`TokenVerifier`]: checks a `Bearer` header value against the published
//!   key set, the expected issuer and audience, and the token's lifetime
//! - [`Authorizer`]: turns verified claims into an [`AuthorizationDecision`]
//! - [`GatewayBoundary`]: validates raw gateway events and collapses every
//!   failure into the opaque [`Unauthorized`]
//!
//! # Decision Model
//!
//! A decision is either an Allow policy for the token's subject, carrying the
//! token's metadata claim as a flat context string, or [`Unauthorized`].
//! Refusals never carry a principal or context. Capability checks happen
//! downstream, against the propagated context.
//!
//! # Example
//!
//! ```rust,no_run
//! use capgate_authorizer::{Authorizer, GatewayBoundary};
//! use capgate_config::Config;
//!
//! # async fn run(event: serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(None)?;
//! let boundary = GatewayBoundary::new(Authorizer::from_config(&config)?);
//!
//! match boundary.handle(event).await {
//!     Ok(decision) => println!("{}", serde_json::to_string(&decision)?),
//!     Err(unauthorized) => println!("{unauthorized}"),
//! }
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

mod authorize;
mod boundary;
mod claims;
mod decision;
mod error;
mod event;
mod verifier;

pub use authorize::Authorizer;
pub use boundary::{GatewayBoundary, Unauthorized};
pub use claims::{Audience, Claims};
pub use decision::{
    AuthorizationDecision, DecisionContext, Effect, INVOKE_ACTION, POLICY_VERSION, PolicyDocument,
    Statement, WILDCARD_RESOURCE,
};
pub use error::{AuthError, AuthResult};
pub use event::AuthorizerEvent;
pub use verifier::{TokenVerifier, parse_bearer};
