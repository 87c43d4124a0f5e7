//! Literal value injection support. Fields marked with `#[value("...")]` receive their payload
//! parsed according to a closed table of supported kinds - see [ValueKind].

use crate::error::ValueError;
use std::any::{type_name, Any, TypeId};
use std::fmt::{Display, Formatter};

/// Kind of a literal value field, determined from the declared field type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ValueKind {
    /// `i32` - payload parsed as a base-10 integer.
    Integer,
    /// `String` - payload passed through unchanged.
    String,
    /// `f64` - payload parsed as a decimal number.
    Double,
    /// Any other type - no value is ever assigned.
    Unsupported,
}

impl ValueKind {
    /// Classifies given declared field type.
    pub fn of<T: 'static>() -> Self {
        Self::from_type_id(TypeId::of::<T>())
    }

    pub fn from_type_id(type_id: TypeId) -> Self {
        if type_id == TypeId::of::<i32>() {
            ValueKind::Integer
        } else if type_id == TypeId::of::<String>() {
            ValueKind::String
        } else if type_id == TypeId::of::<f64>() {
            ValueKind::Double
        } else {
            ValueKind::Unsupported
        }
    }

    /// Parses the literal according to this kind. Returns `None` for [ValueKind::Unsupported].
    pub fn coerce(self, literal: &str) -> Result<Option<Value>, ValueError> {
        let parse_error = |reason: String| ValueError::Parse {
            literal: literal.to_string(),
            kind: self,
            reason,
        };

        match self {
            ValueKind::Integer => literal
                .parse::<i32>()
                .map(|value| Some(Value::Integer(value)))
                .map_err(|error| parse_error(error.to_string())),
            ValueKind::String => Ok(Some(Value::String(literal.to_string()))),
            ValueKind::Double => literal
                .parse::<f64>()
                .map(|value| Some(Value::Double(value)))
                .map_err(|error| parse_error(error.to_string())),
            ValueKind::Unsupported => Ok(None),
        }
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Integer => write!(f, "{}", type_name::<i32>()),
            ValueKind::String => write!(f, "{}", type_name::<String>()),
            ValueKind::Double => write!(f, "{}", type_name::<f64>()),
            ValueKind::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// A coerced literal value, ready to be passed to a setter.
#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    Integer(i32),
    String(String),
    Double(f64),
}

impl Value {
    /// Type-erases the value, so it can be handed to a [ValueSetter](crate::component_registry::ValueSetter).
    pub fn into_any(self) -> Box<dyn Any> {
        match self {
            Value::Integer(value) => Box::new(value),
            Value::String(value) => Box::new(value),
            Value::Double(value) => Box::new(value),
        }
    }
}
