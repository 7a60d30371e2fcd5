//! Node values and their on-disk encodings.
//!
//! A value is either a plain text payload or a structured literal. The variant
//! decides the encoding on write: text goes to a `.txt` file verbatim, anything
//! else is serialized as JSON into a `.json` file.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Tokens accepted as `true` by [`Value::is_truthy`] (compared lowercase).
const TRUTHY_TOKENS: [&str; 2] = ["true", "t"];

/// Value stored at a file node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Structured(serde_json::Value),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::Structured(serde_json::Value::String(text)) => Some(text),
            Value::Structured(_) => None,
        }
    }

    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Structured(value) => Some(value),
            Value::Text(_) => None,
        }
    }

    /// JSON view of the value; text becomes a JSON string.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Text(text) => serde_json::Value::String(text.clone()),
            Value::Structured(value) => value.clone(),
        }
    }

    pub fn into_json(self) -> serde_json::Value {
        match self {
            Value::Text(text) => serde_json::Value::String(text),
            Value::Structured(value) => value,
        }
    }

    /// Encoding selected when this value is written.
    pub fn encoding(&self) -> Encoding {
        match self {
            Value::Text(_) | Value::Structured(serde_json::Value::String(_)) => Encoding::Text,
            Value::Structured(_) => Encoding::Literal,
        }
    }

    /// Case-insensitive match of the rendered value against the truthy tokens.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Structured(serde_json::Value::Bool(flag)) => *flag,
            Value::Structured(serde_json::Value::Null) => false,
            other => {
                let rendered = match other.as_text() {
                    Some(text) => text.to_lowercase(),
                    None => other.to_json().to_string().to_lowercase(),
                };
                TRUTHY_TOKENS.contains(&rendered.as_str())
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => Value::Text(text),
            other => Value::Structured(other),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Structured(serde_json::Value::Bool(flag))
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::Structured(number.into())
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Structured(number.into())
    }
}

/// Physical encoding of a file node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Text payload written verbatim.
    Text,
    /// Structured literal written as JSON.
    Literal,
}

impl Encoding {
    /// Probe order used by the resolver; text wins over structured.
    pub const PRIORITY: [Encoding; 2] = [Encoding::Text, Encoding::Literal];

    pub fn extension(self) -> &'static str {
        match self {
            Encoding::Text => "txt",
            Encoding::Literal => "json",
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::PRIORITY
            .into_iter()
            .find(|encoding| encoding.extension() == extension)
    }

    pub fn encode(self, value: &Value) -> Result<String> {
        if let (Encoding::Text, Some(text)) = (self, value.as_text()) {
            return Ok(text.to_string());
        }
        Ok(serde_json::to_string_pretty(&value.to_json())?)
    }

    pub fn decode(self, content: &str) -> Result<Value> {
        match self {
            Encoding::Text => Ok(Value::Text(content.to_string())),
            Encoding::Literal => {
                let parsed: serde_json::Value = serde_json::from_str(content)?;
                Ok(Value::from(parsed))
            }
        }
    }
}
