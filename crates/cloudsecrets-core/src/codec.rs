//! Secret data codec
//!
//! Remote secret stores keep a single opaque string per secret version. This
//! module converts between that wire text and [`SecretValue`]:
//!
//! - a JSON object on the wire becomes [`SecretValue::Map`]
//! - anything that is not JSON, or is a JSON scalar, is kept verbatim as
//!   [`SecretValue::Raw`]
//! - a JSON array on the wire is an error
//!
//! Encoding is the reverse: maps are serialized as compact JSON and raw text
//! is written unchanged. Array-shaped authoring data never becomes a
//! `SecretValue` in the first place.

use serde_json::Value;
use thiserror::Error;

use crate::types::{SecretMap, SecretValue};

/// Errors raised while converting secret data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Authoring data was a sequence
    #[error("create secret: array is not allowed")]
    ArrayNotAllowed,

    /// Wire value parsed as a JSON array
    #[error("get secret '{secret}': JSON secret must be a map, not array")]
    NotAMap { secret: String },

    /// Authoring data was null or absent
    #[error("create secret: secret data is empty")]
    MissingData,

    /// Map could not be serialized (non-string keys in YAML input)
    #[error("create secret: {0}")]
    Serialize(String),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Decode wire text fetched for `secret`
///
/// The array probe runs first and only matters when the object parse fails:
/// valid JSON arrays are rejected, everything else that is not an object is
/// returned untouched.
pub fn decode(wire: &str, secret: &str) -> CodecResult<SecretValue> {
    let array_probe = serde_json::from_str::<Vec<Value>>(wire);

    match serde_json::from_str::<SecretMap>(wire) {
        Ok(map) => Ok(SecretValue::Map(map)),
        Err(_) if array_probe.is_ok() => Err(CodecError::NotAMap {
            secret: secret.to_string(),
        }),
        Err(_) => {
            crate::debug_log!("Secret '{}' is not JSON, creating raw data", secret);
            Ok(SecretValue::Raw(wire.to_string()))
        }
    }
}

/// Encode a value into wire text
pub fn encode(value: &SecretValue) -> CodecResult<String> {
    match value {
        SecretValue::Raw(text) => Ok(text.clone()),
        SecretValue::Map(map) => {
            serde_json::to_string(map).map_err(|e| CodecError::Serialize(e.to_string()))
        }
    }
}

/// Convert free-form authoring data and encode it
pub fn encode_data(data: &Value) -> CodecResult<String> {
    encode(&SecretValue::try_from(data.clone())?)
}

impl TryFrom<Value> for SecretValue {
    type Error = CodecError;

    fn try_from(value: Value) -> CodecResult<Self> {
        match value {
            Value::Object(map) => Ok(SecretValue::Map(map)),
            Value::Array(_) => Err(CodecError::ArrayNotAllowed),
            Value::Null => Err(CodecError::MissingData),
            Value::String(text) => Ok(SecretValue::Raw(text)),
            Value::Bool(flag) => Ok(SecretValue::Raw(flag.to_string())),
            Value::Number(number) => Ok(SecretValue::Raw(number.to_string())),
        }
    }
}

impl SecretValue {
    /// Convert the `secret_data` of a YAML descriptor
    pub fn from_yaml(value: serde_yaml::Value) -> CodecResult<Self> {
        use serde_yaml::Value as Yaml;

        match value {
            Yaml::Sequence(_) => Err(CodecError::ArrayNotAllowed),
            Yaml::Null => Err(CodecError::MissingData),
            Yaml::String(text) => Ok(SecretValue::Raw(text)),
            Yaml::Bool(flag) => Ok(SecretValue::Raw(flag.to_string())),
            Yaml::Number(number) => Ok(SecretValue::Raw(number.to_string())),
            Yaml::Tagged(tagged) => Self::from_yaml(tagged.value),
            mapping @ Yaml::Mapping(_) => {
                let json = serde_json::to_value(mapping)
                    .map_err(|e| CodecError::Serialize(e.to_string()))?;
                Self::try_from(json)
            }
        }
    }
}
