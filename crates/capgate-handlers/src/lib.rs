//! Capgate Handlers - the contract between the authorizer and the handlers
//! behind it.
//!
//! This crate provides:
//! - [`ProxyRequest`]: the request shape handlers receive, including the
//!   authorizer's principal and propagated capability context
//! - [`CapabilityGuard`]: admission by one named, unexpired capability
//! - [`HandlerError`]: the single error-to-status table
//! - The endpoints: [`GetThing`], [`GetCapabilities`], [`LicenseCheck`] and
//!   [`PostSignUp`]
//! - [`LicenseService`] and [`IdentityProvider`]: the external services the
//!   license endpoints drive
//!
//! # Example
//!
//! ```rust,no_run
//! use capgate_handlers::{GetThing, ProxyRequest, respond};
//!
//! # async fn run(raw: serde_json::Value) -> Result<(), serde_json::Error> {
//! let request: ProxyRequest = serde_json::from_value(raw)?;
//! let response = respond(&GetThing::new(), &request).await;
//! println!("{}", response.status_code);
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

mod endpoint;
mod error;
mod guard;
mod license;
mod request;
mod response;
mod things;

pub use endpoint::{Endpoint, respond, respond_at};
pub use error::{HandlerError, HandlerResult};
pub use guard::{Admitted, CapabilityGuard, authenticate};
pub use license::{
    IdentityProvider, LicenseCheck, LicenseService, LicenseStatus, LicenseSync, PostSignUp,
};
pub use request::{AuthorizerContext, GatewayContext, ProxyRequest};
pub use response::{DEFAULT_HEADERS, HandlerResponse};
pub use things::{EARLY_ACCESS, GetCapabilities, GetThing};
