//! Capability metadata and its propagated context encoding.
//!
//! The gateway only propagates flat string values from the authorizer to
//! downstream handlers, so the token's metadata object travels as a single
//! JSON string. An absent metadata claim travels as the empty string.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CapabilityError, CapabilityResult};
use crate::map::CapabilityMap;

/// The token metadata object that carries capabilities.
///
/// Fields other than `capabilities` are preserved untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityMetadata {
    /// Capability grants. Missing in the source object means none.
    #[serde(default)]
    pub capabilities: CapabilityMap,
    /// Any other metadata fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CapabilityMetadata {
    /// Metadata holding only `capabilities`.
    #[must_use]
    pub fn with_capabilities(capabilities: CapabilityMap) -> Self {
        Self {
            capabilities,
            extra: Map::new(),
        }
    }

    /// Parse a propagated context string.
    ///
    /// Returns `Ok(None)` for the empty string and for JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::InvalidContext`] if the string is not a JSON
    /// object of the expected shape.
    pub fn parse_context(context: &str) -> CapabilityResult<Option<Self>> {
        if context.trim().is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(context)
            .map_err(|e| CapabilityError::InvalidContext(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Interpret a metadata claim value.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::InvalidContext`] if the value is neither
    /// `null` nor an object of the expected shape.
    pub fn from_value(value: &Value) -> CapabilityResult<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Object(_) => Self::deserialize(value)
                .map(Some)
                .map_err(|e| CapabilityError::InvalidContext(e.to_string())),
            other => Err(CapabilityError::InvalidContext(format!(
                "expected an object, found {}",
                json_kind(other)
            ))),
        }
    }

    /// Encode as a propagated context string.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::SerializationError`] if encoding fails.
    pub fn to_context(&self) -> CapabilityResult<String> {
        serde_json::to_string(self).map_err(|e| CapabilityError::SerializationError(e.to_string()))
    }

    /// Convert into a JSON value suitable for an identity provider update.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::SerializationError`] if encoding fails.
    pub fn to_value(&self) -> CapabilityResult<Value> {
        serde_json::to_value(self).map_err(|e| CapabilityError::SerializationError(e.to_string()))
    }
}

/// Encode a raw metadata claim for propagation.
///
/// The claim is passed through opaquely; `None` and `null` become `""`.
#[must_use]
pub fn encode_context(metadata: Option<&Value>) -> String {
    match metadata {
        None | Some(Value::Null) => String::new(),
        Some(value) => value.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
