//! Variable type tags and conversion

use crate::error::{CoreError, CoreResult};
use crate::value::Value;
use std::fmt;

/// The declared type of a variable.
///
/// A closed set: every variable in a spec carries one of these tags, and
/// every raw value must convert through it before use.
#[derive(Debug, Clone, PartialEq)]
pub enum VarType {
    Str,
    Int,
    Float,
    Bool,
    /// Enumerated string with a fixed option list
    Enum(Vec<String>),
    /// Hostname-shaped string (RFC 1123 labels joined by dots)
    Hostname,
}

impl VarType {
    /// Build a type from a spec `type` tag and optional `options` list.
    ///
    /// `str` and `string` are both accepted for the string type.
    pub fn from_tag(tag: &str, options: Option<Vec<String>>) -> CoreResult<VarType> {
        match tag {
            "str" | "string" => Ok(VarType::Str),
            "int" => Ok(VarType::Int),
            "float" => Ok(VarType::Float),
            "bool" => Ok(VarType::Bool),
            "hostname" => Ok(VarType::Hostname),
            "enum" => {
                let options = options.unwrap_or_default();
                if options.is_empty() {
                    return Err(CoreError::SpecStructure {
                        message: "enum variable requires a non-empty 'options' list".to_string(),
                    });
                }
                Ok(VarType::Enum(options))
            }
            other => Err(CoreError::SpecStructure {
                message: format!("unknown variable type '{other}'"),
            }),
        }
    }

    /// The spec tag for this type
    pub fn tag(&self) -> &'static str {
        match self {
            VarType::Str => "str",
            VarType::Int => "int",
            VarType::Float => "float",
            VarType::Bool => "bool",
            VarType::Enum(_) => "enum",
            VarType::Hostname => "hostname",
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, VarType::Bool)
    }

    /// Option list for enum types
    pub fn options(&self) -> Option<&[String]> {
        match self {
            VarType::Enum(options) => Some(options),
            _ => None,
        }
    }

    /// Convert a raw scalar to this type, normalizing its representation.
    pub fn convert(&self, raw: &Value) -> CoreResult<Value> {
        match self {
            VarType::Str => Ok(Value::Str(raw.to_string())),
            VarType::Int => convert_int(raw),
            VarType::Float => convert_float(raw),
            VarType::Bool => convert_bool(raw),
            VarType::Enum(options) => convert_enum(raw, options),
            VarType::Hostname => convert_hostname(raw),
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

fn conversion_error(raw: &Value, expected: &str) -> CoreError {
    CoreError::Conversion {
        value: raw.to_string(),
        expected: expected.to_string(),
    }
}

fn convert_int(raw: &Value) -> CoreResult<Value> {
    match raw {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Float(f) if f.fract() == 0.0 => Ok(Value::Int(*f as i64)),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| conversion_error(raw, "int")),
        _ => Err(conversion_error(raw, "int")),
    }
}

fn convert_float(raw: &Value) -> CoreResult<Value> {
    match raw {
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| conversion_error(raw, "float")),
        _ => Err(conversion_error(raw, "float")),
    }
}

fn convert_bool(raw: &Value) -> CoreResult<Value> {
    match raw {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Int(0) => Ok(Value::Bool(false)),
        Value::Int(1) => Ok(Value::Bool(true)),
        Value::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err(conversion_error(raw, "bool")),
        },
        _ => Err(conversion_error(raw, "bool")),
    }
}

fn convert_enum(raw: &Value, options: &[String]) -> CoreResult<Value> {
    let text = raw.to_string();
    if options.iter().any(|o| o == &text) {
        Ok(Value::Str(text))
    } else {
        Err(CoreError::Conversion {
            value: text,
            expected: format!("one of [{}]", options.join(", ")),
        })
    }
}

fn convert_hostname(raw: &Value) -> CoreResult<Value> {
    let text = raw.to_string();
    if is_valid_hostname(&text) {
        Ok(Value::Str(text))
    } else {
        Err(conversion_error(raw, "hostname"))
    }
}

/// RFC 1123 shape: dot-separated labels of alphanumerics and hyphens,
/// no label starting or ending with a hyphen, total length <= 253.
fn is_valid_hostname(text: &str) -> bool {
    if text.is_empty() || text.len() > 253 {
        return false;
    }
    text.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}

#[cfg(test)]
#[path = "var_type_test.rs"]
mod tests;
