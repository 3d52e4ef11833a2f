//! Host-side values exchanged with foreign functions

use std::fmt;

/// A value passed into or returned from a foreign call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Integer value (marshaled as C int)
    Int(i32),
    /// Text value (marshaled as a NUL-terminated C string)
    Text(String),
    /// No value
    Unit,
}

/// Kind tag of a `Value`, used for signature checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Text,
    Unit,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Text(_) => ValueKind::Text,
            Value::Unit => ValueKind::Unit,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Int => "int",
            ValueKind::Text => "text",
            ValueKind::Unit => "unit",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Unit => f.write_str("()"),
        }
    }
}
