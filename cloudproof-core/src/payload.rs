//! Boundary model for activity payloads received from the API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Raw activity payload as returned by the activity and profile endpoints.
///
/// Every field is optional and kept as untyped JSON; coercion happens in the
/// heatmap and summary builders so a malformed field only affects itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityPayload {
    /// Public username, present on profile responses.
    #[serde(default)]
    pub username: Option<Value>,
    /// Date key → score mapping.
    #[serde(default)]
    pub heatmap: Option<Value>,
    /// Total score across services.
    #[serde(default)]
    pub total_score: Option<Value>,
    /// Service name → score mapping.
    #[serde(default)]
    pub services: Option<Value>,
    /// Most-recent-first list of scored actions.
    #[serde(default)]
    pub recent_actions: Option<Value>,
}

impl ActivityPayload {
    /// Read a payload from any JSON value.
    ///
    /// Non-object values yield an empty payload.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };
        Self {
            username: fields.remove("username"),
            heatmap: fields.remove("heatmap"),
            total_score: fields.remove("total_score"),
            services: fields.remove("services"),
            recent_actions: fields.remove("recent_actions"),
        }
    }

    /// Parse a payload from JSON text.
    ///
    /// Only text that is not JSON at all is an error.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(value))
    }

    /// Parse a payload from JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Ok(Self::from_value(value))
    }

    /// Username when it is a non-empty string.
    pub fn username(&self) -> Option<String> {
        match &self.username {
            Some(Value::String(name)) if !name.trim().is_empty() => Some(name.clone()),
            _ => None,
        }
    }
}
