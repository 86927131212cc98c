//! Uniform result envelope returned by every action.
//!
//! This is the only contract the command loop depends on: it never sees a
//! `Result::Err` or a panic from the action core, just an `ActionResult`
//! with `success`, an optional message, an optional error and optional
//! structured data.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl ActionResult {
    /// Successful result with no message or data.
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            error: None,
            data: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            data: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Add one `data` entry, creating the map on first use.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Look up a `data` entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|d| d.get(key))
    }

    /// Convenience for boolean `data` entries (`led_on`, `blinking`, ...).
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }
}

impl From<Error> for ActionResult {
    fn from(e: Error) -> Self {
        Self::failure(e.to_string())
    }
}
