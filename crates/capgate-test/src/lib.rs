//! Capgate Test - shared test fixtures for the capgate workspace.
//!
//! Provides an RSA key pair published as a JSON Web Key Set, a builder for
//! signed tokens in the shape the identity provider issues, and gateway
//! authorizer events.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! capgate-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use capgate_test::{TestToken, test_key_set, TEST_KID};
//!
//! let jwks = test_key_set(&[TEST_KID]);
//! let header = TestToken::new().capabilities(&[("eap", "2030-01-01T00:00:00Z")]).bearer();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod keys;
pub mod tokens;

pub use keys::*;
pub use tokens::*;
