//! Parsed JSON responses.
//!
//! The Graph API answers with camelCase keys (`displayName`); the parsed
//! representation normalizes every key, recursively, to the snake_case
//! casing callers address attributes by (`display_name`). Keys without
//! camel humps, such as `@odata.context`, are left alone.

use crate::error::GraphError;
use serde::Serialize;
use serde_json::Value;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// An attribute-addressable JSON response with normalized key casing.
///
/// Constructed fresh per response and immutable afterwards. The underlying
/// tree is a plain [`serde_json::Value`]; the typed accessors cover the
/// common leaf lookups, and the whole tree serializes transparently for
/// callers deserializing into their own types.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParsedResponse {
    value: Value,
}

impl ParsedResponse {
    /// Parse raw response bytes.
    ///
    /// Strips a leading UTF-8 BOM (some Graph endpoints emit one) and treats
    /// an empty body as JSON null, which is how 204 No Content responses
    /// surface.
    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<Self, GraphError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let text =
            std::str::from_utf8(bytes).map_err(|e| GraphError::Parse(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Self { value: Value::Null });
        }
        let value: Value =
            serde_json::from_str(text).map_err(|e| GraphError::Parse(e.to_string()))?;
        Ok(Self::from_value(value))
    }

    /// Wrap an already-parsed JSON value, normalizing its keys.
    pub fn from_value(value: Value) -> Self {
        Self {
            value: normalize(value),
        }
    }

    /// Wrap a value whose keys are already normalized (sub-trees of an
    /// existing `ParsedResponse`).
    pub(crate) fn from_normalized(value: Value) -> Self {
        Self { value }
    }

    /// The underlying JSON tree.
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// Consume the response, yielding the underlying JSON tree.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Look up a top-level key by its normalized (snake_case) name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.value.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.get(key).and_then(Value::as_array)
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}

fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (underscore(&k), normalize(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        other => other,
    }
}

/// `displayName` -> `display_name`. The word boundary is a lowercase letter
/// followed by an uppercase one; uppercase runs and digit-adjacent capitals
/// fold without a separator (`formulasR1C1` -> `formulas_r1c1`). A key with
/// no uppercase characters comes back unchanged.
fn underscore(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lowercase = false;
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            if prev_lowercase {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
        prev_lowercase = c.is_ascii_lowercase();
    }
    out
}
