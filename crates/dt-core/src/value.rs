//! Scalar values and field types

use std::fmt;
use serde::{Serialize, Deserialize};

/// Semantic type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Time,
    Number,
    String,
    Boolean,
    #[default]
    Other,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Time => "time",
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Other => "other",
        };
        f.write_str(name)
    }
}

/// A single cell value
///
/// `Null` doubles as the placeholder appended to fields that have no
/// reducer configured.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Key used to compare values for equality in distinct/change counting.
    ///
    /// Numbers compare by bit pattern so that `NaN` equals itself.
    pub fn identity_key(&self) -> ValueKey<'_> {
        match self {
            Value::Null => ValueKey::Null,
            Value::Boolean(b) => ValueKey::Boolean(*b),
            Value::Number(n) => ValueKey::Number(n.to_bits()),
            Value::String(s) => ValueKey::String(s),
        }
    }
}

/// Hashable projection of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKey<'a> {
    Null,
    Boolean(bool),
    Number(u64),
    String(&'a str),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_key_treats_nan_as_equal() {
        let a = Value::Number(f64::NAN);
        let b = Value::Number(f64::NAN);
        assert_ne!(a, b);
        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<f64>), Value::Null);
        assert_eq!(Value::from(Some(2.5)), Value::Number(2.5));
    }

    #[test]
    fn test_untagged_json_shape() {
        let values: Vec<Value> = serde_json::from_str(r#"[1.5, "a", true, null]"#).unwrap();
        assert_eq!(
            values,
            vec![Value::Number(1.5), Value::from("a"), Value::Boolean(true), Value::Null]
        );
    }
}
