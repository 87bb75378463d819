//! SQL parameter values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value bound to a statement parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// UTC timestamp value.
    DateTime(DateTime<Utc>),
}

impl Value {
    /// Returns `Null` when the value is the zero value for its type.
    ///
    /// Synthesized foreign-key columns store NULL instead of a zero-valued
    /// related key, so an unsaved related record never produces a dangling
    /// reference.
    #[must_use]
    pub fn zero_to_null(self) -> Self {
        match self {
            Self::Int(0) => Self::Null,
            Self::Text(ref s) if s.is_empty() => Self::Null,
            other => other,
        }
    }

    /// Returns true when the value is `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Conversion into a [`Value`].
pub trait ToValue {
    /// Converts `self` into a `Value`.
    fn to_value(self) -> Value;
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

impl ToValue for bool {
    fn to_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ToValue for i64 {
    fn to_value(self) -> Value {
        Value::Int(self)
    }
}

impl ToValue for i32 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToValue for i16 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToValue for i8 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToValue for u8 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToValue for u16 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToValue for u32 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToValue for f64 {
    fn to_value(self) -> Value {
        Value::Float(self)
    }
}

impl ToValue for f32 {
    fn to_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl ToValue for String {
    fn to_value(self) -> Value {
        Value::Text(self)
    }
}

impl ToValue for &str {
    fn to_value(self) -> Value {
        Value::Text(String::from(self))
    }
}

impl ToValue for Vec<u8> {
    fn to_value(self) -> Value {
        Value::Blob(self)
    }
}

impl ToValue for DateTime<Utc> {
    fn to_value(self) -> Value {
        Value::DateTime(self)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}
