//! Runtime values.

use crate::error::RuntimeError;
use crate::interner::ObjString;
use crate::object::{Function, Obj};
use std::fmt;
use std::rc::Rc;

/// A runtime value: `null`, a boolean, an integer, or a reference to a
/// heap object. Cloning a value never copies the object it refers to.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Obj(Obj),
}

impl Value {
    pub fn string(string: Rc<ObjString>) -> Self {
        Value::Obj(Obj::String(string))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Obj(object) => object.type_name(),
        }
    }

    /// Only `null` and `false` are falsey.
    pub fn is_falsey(&self) -> bool {
        matches!(self, Value::Null | Value::Bool(false))
    }

    pub fn as_int(&self) -> Result<i64, RuntimeError> {
        match self {
            Value::Int(value) => Ok(*value),
            other => Err(mismatch("an integer", other)),
        }
    }

    pub fn as_string(&self) -> Result<&Rc<ObjString>, RuntimeError> {
        match self {
            Value::Obj(Obj::String(string)) => Ok(string),
            other => Err(mismatch("a string", other)),
        }
    }

    pub fn as_function(&self) -> Result<&Rc<Function>, RuntimeError> {
        match self {
            Value::Obj(Obj::Function(function)) => Ok(function),
            other => Err(mismatch("a function", other)),
        }
    }

}

fn mismatch(expected: &str, found: &Value) -> RuntimeError {
    RuntimeError::TypeMismatch(format!(
        "Expected {} but found {}.",
        expected,
        found.type_name()
    ))
}

/// Scalars compare by value. Objects compare by identity, which for
/// interned strings is the same as comparing their contents.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Obj(a), Value::Obj(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Int(value) => write!(f, "{}", value),
            Value::Obj(object) => write!(f, "{}", object),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}
