//! Capgate Capabilities - time-bounded capabilities carried in token metadata.
//!
//! This crate provides:
//! - [`CapabilityMap`]: capability name to expiry timestamp
//! - [`has_capability`]: the admission predicate
//! - [`CapabilityMetadata`]: the token metadata object holding the map, and
//!   its encoding as a flat context string for gateway propagation
//!
//! # Grant Semantics
//!
//! A capability is granted iff it is present and its expiry is strictly
//! after the evaluation instant. Absent and expired capabilities are both
//! refused; [`CapabilityMap::evaluate`] tells them apart for logging.
//!
//! # Example
//!
//! ```
//! use capgate_capabilities::{CapabilityMetadata, has_capability};
//! use chrono::{TimeZone, Utc};
//!
//! let context = r#"{"capabilities":{"eap":"2030-01-01T00:00:00Z"}}"#;
//! let metadata = CapabilityMetadata::parse_context(context).unwrap().unwrap();
//!
//! let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
//! assert!(has_capability("eap", &metadata.capabilities, now));
//! assert!(!has_capability("pro", &metadata.capabilities, now));
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
mod map;

pub use context::{CapabilityMetadata, encode_context};
pub use error::{CapabilityError, CapabilityResult};
pub use map::{CapabilityMap, CapabilityStatus, has_capability};
