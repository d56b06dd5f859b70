//! Decoded secret payloads

use serde::Serialize;
use serde_json::Value;

/// String-keyed secret map.
///
/// `serde_json::Map` keeps keys sorted, so encoding a map is stable.
pub type SecretMap = serde_json::Map<String, Value>;

/// A decoded secret payload
///
/// Remote stores only hold opaque text. A payload that is a JSON object is
/// exposed as a [`SecretValue::Map`]; anything else is kept verbatim as
/// [`SecretValue::Raw`]. Arrays have no representation here, so array-shaped
/// data is rejected when it is converted into a `SecretValue`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SecretValue {
    /// Opaque text, returned exactly as stored
    Raw(String),
    /// JSON object payload
    Map(SecretMap),
}

impl SecretValue {
    /// Create a raw text value
    pub fn raw(text: impl Into<String>) -> Self {
        SecretValue::Raw(text.into())
    }

    /// Raw text, if this is a raw value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SecretValue::Raw(text) => Some(text),
            SecretValue::Map(_) => None,
        }
    }

    /// Map contents, if this is a structured value
    pub fn as_map(&self) -> Option<&SecretMap> {
        match self {
            SecretValue::Raw(_) => None,
            SecretValue::Map(map) => Some(map),
        }
    }

    /// Look up a key in a structured value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, SecretValue::Map(_))
    }

    /// JSON view of the value, as handed to templates by the host
    pub fn to_json(&self) -> Value {
        match self {
            SecretValue::Raw(text) => Value::String(text.clone()),
            SecretValue::Map(map) => Value::Object(map.clone()),
        }
    }
}

impl From<String> for SecretValue {
    fn from(text: String) -> Self {
        SecretValue::Raw(text)
    }
}

impl From<&str> for SecretValue {
    fn from(text: &str) -> Self {
        SecretValue::Raw(text.to_string())
    }
}

impl From<SecretMap> for SecretValue {
    fn from(map: SecretMap) -> Self {
        SecretValue::Map(map)
    }
}
