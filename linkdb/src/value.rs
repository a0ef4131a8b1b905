//! Tagged values stored in object fields and used as query literals.
//!
//! Every field value carries its type tag. Predicate evaluation dispatches on
//! the tag and reports a type mismatch instead of coercing, so a query
//! literal must match the declared field type exactly.

use crate::schema::types::FieldType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value held by an object field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 32-bit signed integer.
    Int(i32),
    /// 32-bit floating point.
    Float(f32),
    /// 64-bit floating point.
    Double(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    String(String),
}

impl Value {
    /// Returns the declared type this value satisfies.
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Int(_) => FieldType::Int,
            Value::Float(_) => FieldType::Float,
            Value::Double(_) => FieldType::Double,
            Value::Bool(_) => FieldType::Bool,
            Value::String(_) => FieldType::String,
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        self.field_type().name()
    }

    /// The default value a freshly created object carries for `field_type`.
    pub fn default_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Int => Value::Int(0),
            FieldType::Float => Value::Float(0.0),
            FieldType::Double => Value::Double(0.0),
            FieldType::Bool => Value::Bool(false),
            FieldType::String => Value::String(String::new()),
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Double(d) => write!(f, "{}", d),
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_tags() {
        assert_eq!(Value::Int(42).field_type(), FieldType::Int);
        assert_eq!(Value::Float(1.2).field_type(), FieldType::Float);
        assert_eq!(Value::Double(9.9).field_type(), FieldType::Double);
        assert_eq!(Value::Bool(true).field_type(), FieldType::Bool);
        assert_eq!(Value::String("x".into()).field_type(), FieldType::String);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Value::default_for(FieldType::Int), Value::Int(0));
        assert_eq!(Value::default_for(FieldType::Bool), Value::Bool(false));
        assert_eq!(
            Value::default_for(FieldType::String),
            Value::String(String::new())
        );
    }

    #[test]
    fn test_from_impls() {
        assert_eq!(Value::from(5), Value::Int(5));
        assert_eq!(Value::from(0.7f32), Value::Float(0.7));
        assert_eq!(Value::from(11.3), Value::Double(11.3));
        assert_eq!(Value::from("Pluto"), Value::String("Pluto".into()));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int(10).as_int(), Some(10));
        assert_eq!(Value::Int(10).as_double(), None);
        assert_eq!(Value::String("Fido".into()).as_str(), Some("Fido"));
    }
}
