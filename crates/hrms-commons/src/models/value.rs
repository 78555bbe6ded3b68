//! Storage-agnostic cell value.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::fmt;

// ASCII digits only; `\d` would also match other Unicode digit classes.
static DECIMAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?$").unwrap()
});

/// A decoded store cell.
///
/// JSON encoding:
/// - `Null` → `null`
/// - `Text` → string
/// - `Number` → string holding the exact decimal text (no float rounding)
/// - `Boolean` → bool
/// - `Binary` → array of byte values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Text(String),
    Number(String),
    Boolean(bool),
    Binary(Vec<u8>),
}

impl Value {
    /// Integer cell.
    pub fn integer(value: i64) -> Self {
        Value::Number(value.to_string())
    }

    /// Real cell, rendered as the shortest decimal text that round-trips.
    ///
    /// Returns `None` for NaN and infinities, which have no decimal form.
    pub fn real(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Some(Value::Number(format!("{:?}", value)))
    }

    /// Decimal literal kept verbatim. Returns `None` if `text` is not a
    /// well-formed decimal (`[+-]digits[.digits][e[+-]digits]`).
    pub fn decimal(text: &str) -> Option<Self> {
        if is_decimal_literal(text) {
            Some(Value::Number(text.to_string()))
        } else {
            None
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "text",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Binary(_) => "binary",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Text(s) | Value::Number(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Binary(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Text(s) | Value::Number(s) => serializer.serialize_str(s),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Binary(bytes) => {
                let mut seq = serializer.serialize_seq(Some(bytes.len()))?;
                for byte in bytes {
                    seq.serialize_element(byte)?;
                }
                seq.end()
            }
        }
    }
}

fn is_decimal_literal(text: &str) -> bool {
    DECIMAL_RE.is_match(text)
}
