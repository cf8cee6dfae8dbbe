//! Webhook payload construction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding the template variables in every TRMNL payload.
pub const MERGE_VARIABLES: &str = "merge_variables";

/// JSON body sent to a TRMNL webhook.
///
/// Wraps an arbitrary JSON value. Payloads supplied as JSON keep their key
/// order on the wire; only whitespace changes. The usual shape is
/// `{"merge_variables": {"content": "...", "title": "...", ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WebhookPayload(Value);

impl WebhookPayload {
    /// Builds a payload from raw user input.
    ///
    /// - A JSON object with a `merge_variables` key is used as-is.
    /// - Any other JSON value is wrapped as `{"merge_variables": <value>}`.
    /// - Everything else (including a bare `null`) is treated as HTML and becomes
    ///   `{"merge_variables": {"content": <input>}}`.
    #[must_use]
    pub fn from_input(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) if map.contains_key(MERGE_VARIABLES) => Self(Value::Object(map)),
            Ok(Value::Null) | Err(_) => Self::from_content(raw),
            Ok(other) => Self::wrap(other),
        }
    }

    /// Builds a payload whose only merge variable is `content`.
    #[must_use]
    pub fn from_content(content: impl Into<String>) -> Self {
        let mut vars = Map::new();
        vars.insert("content".to_string(), Value::String(content.into()));
        Self::wrap(Value::Object(vars))
    }

    /// Wraps a value as the payload's `merge_variables`.
    #[must_use]
    pub fn wrap(merge_variables: Value) -> Self {
        let mut root = Map::new();
        root.insert(MERGE_VARIABLES.to_string(), merge_variables);
        Self(Value::Object(root))
    }

    /// Uses a JSON value as the complete payload, without any wrapping.
    #[must_use]
    pub const fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Returns `merge_variables`, or `None` when the key is absent or null.
    #[must_use]
    pub fn merge_variables(&self) -> Option<&Value> {
        self.0.get(MERGE_VARIABLES).filter(|v| !v.is_null())
    }

    /// Returns a merge variable by name.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.merge_variables().and_then(|vars| vars.get(name))
    }

    /// Returns the `content` merge variable when it is a non-empty string.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.variable("content")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Compact JSON text of the payload, exactly as sent over the wire.
    #[must_use]
    pub fn to_json(&self) -> String {
        self.0.to_string()
    }
}

impl From<Value> for WebhookPayload {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

/// Returns true if a merge variable counts as "not provided".
///
/// Null, `false`, `""` and numeric zero are all blank.
pub(crate) fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null | Value::Bool(false)) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f == 0.0),
        Some(_) => false,
    }
}
