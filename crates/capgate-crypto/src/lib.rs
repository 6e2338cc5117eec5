//! Capgate Crypto - signing key resolution for bearer token verification.
//!
//! This crate provides:
//! - [`SigningKey`]: a public verification key decoded from a JSON Web Key
//! - [`KeySetSource`]: the seam to a published key set (JWKS) endpoint
//! - [`HttpKeySetSource`]: the `reqwest` implementation with explicit timeouts
//! - [`KeyResolver`]: a cached, rate-limited resolver keyed by key id
//!
//! # Resolution Model
//!
//! A resolver is constructed once per process and shared by reference. A
//! cache hit never touches the network. Concurrent misses are serialized
//! through a single-flight section, so a burst of requests for a freshly
//! rotated key produces one upstream fetch.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use capgate_crypto::{HttpKeySetSource, KeyResolver, ResolverConfig};
//!
//! # async fn run() -> Result<(), capgate_crypto::KeyResolutionError> {
//! let source = HttpKeySetSource::new("https://issuer.example/.well-known/jwks.json")?;
//! let resolver = KeyResolver::new(Arc::new(source), ResolverConfig::default());
//!
//! let key = resolver.resolve("ins_2abc").await?;
//! println!("resolved {}", key.kid());
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

mod error;
mod key;
mod resolver;
mod source;

pub use error::{KeyResolutionError, KeyResult};
pub use key::{SigningKey, parse_key_set};
pub use resolver::{KeyResolver, ResolverConfig};
pub use source::{DEFAULT_FETCH_TIMEOUT, HttpKeySetSource, KeySetSource};

#[cfg(any(test, feature = "test-support"))]
pub use source::testing;
