//! Scalar values carried by variables

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar variable value.
///
/// Specs and overrides arrive as YAML scalars; everything non-scalar is
/// rejected at parse time so the rest of the engine only ever sees one of
/// these four shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Convert a YAML scalar into a `Value`.
    ///
    /// Returns `Ok(None)` for YAML null. Mappings and sequences are not
    /// valid variable values.
    pub fn from_yaml(raw: &serde_yaml::Value) -> CoreResult<Option<Value>> {
        match raw {
            serde_yaml::Value::Null => Ok(None),
            serde_yaml::Value::Bool(b) => Ok(Some(Value::Bool(*b))),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Some(Value::Int(i)))
                } else if let Some(f) = n.as_f64() {
                    Ok(Some(Value::Float(f)))
                } else {
                    Err(CoreError::SpecStructure {
                        message: format!("unrepresentable number: {n}"),
                    })
                }
            }
            serde_yaml::Value::String(s) => Ok(Some(Value::Str(s.clone()))),
            other => Err(CoreError::SpecStructure {
                message: format!("expected a scalar value, got {}", yaml_kind(other)),
            }),
        }
    }

    /// Convert back to a YAML value (for render contexts and serialization)
    pub fn to_yaml(&self) -> serde_yaml::Value {
        match self {
            Value::Bool(b) => serde_yaml::Value::Bool(*b),
            Value::Int(i) => serde_yaml::Value::Number((*i).into()),
            Value::Float(f) => serde_yaml::Value::Number(serde_yaml::Number::from(*f)),
            Value::Str(s) => serde_yaml::Value::String(s.clone()),
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
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// True for the empty string; every other scalar counts as non-empty
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Str(s) if s.is_empty())
    }

    /// Truthiness in the spirit of template conditionals: false, 0, 0.0 and
    /// the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

/// Human-readable YAML node kind for error messages
pub(crate) fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "bool",
        serde_yaml::Value::Number(_) => "number",
        serde_yaml::Value::String(_) => "string",
        serde_yaml::Value::Sequence(_) => "sequence",
        serde_yaml::Value::Mapping(_) => "mapping",
        serde_yaml::Value::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
#[path = "value_test.rs"]
mod tests;
