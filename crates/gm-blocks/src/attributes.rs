//! Block attribute header codec.
//!
//! The header of `<!-- wp:image {"id":12,"sizeSlug":"large"} -->` is a JSON
//! object. It is decoded into an ordered map so that re-encoding keeps keys in
//! their original order and leaves keys the handlers never touch as they were.

use serde_json::{Map, Value};

use crate::error::{AttributeError, NumericCoercionError};

/// Ordered JSON attributes of one block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap(Map<String, Value>);

impl AttributeMap {
    /// Decode a block header payload.
    ///
    /// # Errors
    ///
    /// Returns [`AttributeError::Json`] for invalid JSON and
    /// [`AttributeError::NotAnObject`] when the root is not an object.
    pub fn decode(text: &str) -> Result<Self, AttributeError> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(AttributeError::NotAnObject),
        }
    }

    /// Encode as compact single-line JSON, safe to embed in an HTML comment.
    #[must_use]
    pub fn encode(&self) -> String {
        // Serializing a map of JSON values cannot fail.
        let json = serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_owned());
        escape_for_comment(&json)
    }

    /// Get an attribute value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a mutable attribute value.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Get a string attribute value.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Set a string attribute only if the key is already present.
    ///
    /// Returns whether the key was present.
    pub fn replace_str(&mut self, key: &str, value: &str) -> bool {
        match self.0.get_mut(key) {
            Some(slot) => {
                *slot = Value::String(value.to_owned());
                true
            }
            None => false,
        }
    }

    /// Parse `value` as an integer and store it under `key`.
    ///
    /// On failure the map is left unmodified for that key.
    pub fn set_integer_safely(
        &mut self,
        key: &str,
        value: &str,
    ) -> Result<(), NumericCoercionError> {
        let number = parse_integer(value).map_err(|source| NumericCoercionError {
            key: key.to_owned(),
            value: value.to_owned(),
            source,
        })?;
        self.insert(key, number);
        Ok(())
    }

    /// Whether the attribute under `key` refers to `local_id`.
    #[must_use]
    pub fn references(&self, key: &str, local_id: &str) -> bool {
        self.get(key).is_some_and(|value| value_matches_id(value, local_id))
    }
}

/// Parse an integer id, accepting surrounding whitespace.
pub(crate) fn parse_integer(value: &str) -> Result<i64, std::num::ParseIntError> {
    value.trim().parse::<i64>()
}

/// Whether a JSON value (string or number) is the given id.
pub(crate) fn value_matches_id(value: &Value, id: &str) -> bool {
    match value {
        Value::String(s) => s == id,
        Value::Number(n) => n.to_string() == id,
        _ => false,
    }
}

/// Replace sequences that would terminate or confuse the surrounding comment.
///
/// Only characters inside JSON strings can produce these, and their unicode
/// escapes decode back to the same string.
fn escape_for_comment(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '-' if chars.peek() == Some(&'-') => {
                chars.next();
                push_unicode_escape(&mut out, '-');
                push_unicode_escape(&mut out, '-');
            }
            '<' | '>' | '&' => push_unicode_escape(&mut out, ch),
            _ => out.push(ch),
        }
    }
    out
}

fn push_unicode_escape(out: &mut String, ch: char) {
    out.push('\\');
    out.push_str(&format!("u{:04x}", u32::from(ch)));
}
