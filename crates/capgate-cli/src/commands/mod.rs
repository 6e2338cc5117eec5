//! CLI command implementations.

pub(crate) mod authorize;
pub(crate) mod check;
pub(crate) mod config;
