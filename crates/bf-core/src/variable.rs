//! A single configurable variable

use crate::error::{CoreError, CoreResult};
use crate::needs::Need;
use crate::origin::Origin;
use crate::value::{yaml_kind, Value};
use crate::var_type::VarType;
use std::collections::HashSet;

/// Fields a spec mapping can explicitly supply for a variable or section.
///
/// Merge semantics depend on knowing which fields were actually present in
/// the higher-precedence source, so each parsed object captures the set of
/// keys it was built from instead of relying on sentinel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Description,
    Toggle,
    Needs,
    Type,
    Default,
    Value,
    Options,
    Sensitive,
    Autogenerated,
    AutogeneratedLength,
    AutogeneratedBase64,
}

/// The set of explicitly-supplied fields, captured at parse time
pub type FieldSet = HashSet<Field>;

const DEFAULT_AUTOGENERATED_LENGTH: usize = 32;

/// A single configurable value with type, provenance and activation
/// conditions.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub var_type: VarType,
    pub description: Option<String>,
    /// Declared default from the spec
    pub default: Option<Value>,
    /// Current value; seeded from the default, then layered by overrides
    pub value: Option<Value>,
    /// Masks display surfaces only
    pub sensitive: bool,
    /// Synthesized at render time when left empty
    pub autogenerated: bool,
    /// Length in characters (plain) or bytes (base64) for autogeneration
    pub autogenerated_length: usize,
    /// Base64-encode random bytes instead of an alphanumeric string
    pub autogenerated_base64: bool,
    pub needs: Vec<Need>,
    pub origin: Origin,
    /// Value before the first config-layer override, kept for display
    pub original_value: Option<Value>,
    pub(crate) original_recorded: bool,
    /// Value before a disabled-bool reset, kept for display
    pub pre_reset_value: Option<Value>,
    /// True when this variable is its section's toggle
    pub(crate) is_toggle: bool,
    pub(crate) explicit: FieldSet,
}

/// Partial update applied when layering one variable definition over
/// another. Only fields set to `Some` are touched; the double-`Option`
/// fields distinguish "leave alone" from "explicitly clear".
#[derive(Debug, Clone, Default)]
pub struct VariablePatch {
    pub origin: Option<Origin>,
    pub var_type: Option<VarType>,
    pub description: Option<Option<String>>,
    pub default: Option<Option<Value>>,
    pub value: Option<Option<Value>>,
    pub sensitive: Option<bool>,
    pub autogenerated: Option<bool>,
    pub autogenerated_length: Option<usize>,
    pub autogenerated_base64: Option<bool>,
    pub needs: Option<Vec<Need>>,
}

impl Variable {
    /// Parse a variable from its spec mapping.
    pub fn from_mapping(
        name: &str,
        data: &serde_yaml::Mapping,
        origin: Origin,
    ) -> CoreResult<Variable> {
        let mut explicit = FieldSet::new();

        let options = match data.get("options") {
            Some(serde_yaml::Value::Sequence(items)) => {
                explicit.insert(Field::Options);
                let mut options = Vec::with_capacity(items.len());
                for item in items {
                    match Value::from_yaml(item)? {
                        Some(value) => options.push(value.to_string()),
                        None => {
                            return Err(CoreError::SpecStructure {
                                message: format!("variable '{name}': null entry in 'options'"),
                            })
                        }
                    }
                }
                Some(options)
            }
            Some(other) => {
                return Err(CoreError::SpecStructure {
                    message: format!(
                        "variable '{name}': 'options' must be a list, got {}",
                        yaml_kind(other)
                    ),
                })
            }
            None => None,
        };

        let type_tag = match data.get("type") {
            Some(serde_yaml::Value::String(tag)) => {
                explicit.insert(Field::Type);
                tag.clone()
            }
            Some(other) => {
                return Err(CoreError::SpecStructure {
                    message: format!(
                        "variable '{name}': 'type' must be a string, got {}",
                        yaml_kind(other)
                    ),
                })
            }
            // A bare options list implies an enum
            None if options.is_some() => "enum".to_string(),
            None => "str".to_string(),
        };

        let var_type = VarType::from_tag(&type_tag, options)?;

        let description = get_optional_string(data, "description", name, &mut explicit)?;

        let default = match data.get("default") {
            Some(raw) => {
                explicit.insert(Field::Default);
                Value::from_yaml(raw)?
            }
            None => None,
        };

        // A spec normally carries only defaults, but persisted collections
        // round-trip through 'value' as well.
        let value = match data.get("value") {
            Some(raw) => {
                explicit.insert(Field::Value);
                Value::from_yaml(raw)?
            }
            None => default.clone(),
        };

        let sensitive = get_bool_flag(data, "sensitive", name, Field::Sensitive, &mut explicit)?;
        let autogenerated =
            get_bool_flag(data, "autogenerated", name, Field::Autogenerated, &mut explicit)?;
        let autogenerated_base64 = get_bool_flag(
            data,
            "autogenerated_base64",
            name,
            Field::AutogeneratedBase64,
            &mut explicit,
        )?;

        let autogenerated_length = match data.get("autogenerated_length") {
            Some(serde_yaml::Value::Number(n)) if n.as_u64().is_some() => {
                explicit.insert(Field::AutogeneratedLength);
                n.as_u64().unwrap() as usize
            }
            Some(other) => {
                return Err(CoreError::SpecStructure {
                    message: format!(
                        "variable '{name}': 'autogenerated_length' must be a positive integer, got {}",
                        yaml_kind(other)
                    ),
                })
            }
            None => DEFAULT_AUTOGENERATED_LENGTH,
        };

        let needs = match data.get("needs") {
            Some(raw) => {
                explicit.insert(Field::Needs);
                Need::parse_entry(raw)?
            }
            None => Vec::new(),
        };

        Ok(Variable {
            name: name.to_string(),
            var_type,
            description,
            default,
            value,
            sensitive,
            autogenerated,
            autogenerated_length,
            autogenerated_base64,
            needs,
            origin,
            original_value: None,
            original_recorded: false,
            pre_reset_value: None,
            is_toggle: false,
            explicit,
        })
    }

    /// Convert a raw scalar to this variable's declared type.
    pub fn convert(&self, raw: &Value) -> CoreResult<Value> {
        self.var_type.convert(raw)
    }

    /// The current value converted to the declared type, or `None` when
    /// unset.
    pub fn typed_value(&self) -> CoreResult<Option<Value>> {
        match &self.value {
            Some(raw) => self.convert(raw).map(Some),
            None => Ok(None),
        }
    }

    /// A variable must be supplied by the user when it has no default, is
    /// not autogenerated, and is not merely its section's toggle.
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.autogenerated && !self.is_toggle
    }

    /// Independent copy with only the patched fields replaced.
    pub fn with_patch(&self, patch: &VariablePatch) -> Variable {
        let mut cloned = self.clone();
        if let Some(origin) = patch.origin {
            cloned.origin = origin;
        }
        if let Some(var_type) = &patch.var_type {
            cloned.var_type = var_type.clone();
            cloned.explicit.insert(Field::Type);
        }
        if let Some(description) = &patch.description {
            cloned.description = description.clone();
            cloned.explicit.insert(Field::Description);
        }
        if let Some(default) = &patch.default {
            cloned.default = default.clone();
            cloned.explicit.insert(Field::Default);
        }
        if let Some(value) = &patch.value {
            cloned.value = value.clone();
            cloned.explicit.insert(Field::Value);
        }
        if let Some(sensitive) = patch.sensitive {
            cloned.sensitive = sensitive;
            cloned.explicit.insert(Field::Sensitive);
        }
        if let Some(autogenerated) = patch.autogenerated {
            cloned.autogenerated = autogenerated;
            cloned.explicit.insert(Field::Autogenerated);
        }
        if let Some(length) = patch.autogenerated_length {
            cloned.autogenerated_length = length;
            cloned.explicit.insert(Field::AutogeneratedLength);
        }
        if let Some(base64) = patch.autogenerated_base64 {
            cloned.autogenerated_base64 = base64;
            cloned.explicit.insert(Field::AutogeneratedBase64);
        }
        if let Some(needs) = &patch.needs {
            cloned.needs = needs.clone();
            cloned.explicit.insert(Field::Needs);
        }
        cloned
    }

    /// Whether the given field was explicitly present in this variable's
    /// source mapping (or set by a later patch).
    pub fn is_explicit(&self, field: Field) -> bool {
        self.explicit.contains(&field)
    }
}

fn get_optional_string(
    data: &serde_yaml::Mapping,
    key: &str,
    name: &str,
    explicit: &mut FieldSet,
) -> CoreResult<Option<String>> {
    match data.get(key) {
        Some(serde_yaml::Value::String(s)) => {
            explicit.insert(Field::Description);
            Ok(Some(s.clone()))
        }
        Some(serde_yaml::Value::Null) => {
            explicit.insert(Field::Description);
            Ok(None)
        }
        Some(other) => Err(CoreError::SpecStructure {
            message: format!(
                "variable '{name}': '{key}' must be a string, got {}",
                yaml_kind(other)
            ),
        }),
        None => Ok(None),
    }
}

fn get_bool_flag(
    data: &serde_yaml::Mapping,
    key: &str,
    name: &str,
    field: Field,
    explicit: &mut FieldSet,
) -> CoreResult<bool> {
    match data.get(key) {
        Some(serde_yaml::Value::Bool(b)) => {
            explicit.insert(field);
            Ok(*b)
        }
        Some(other) => Err(CoreError::SpecStructure {
            message: format!(
                "variable '{name}': '{key}' must be a bool, got {}",
                yaml_kind(other)
            ),
        }),
        None => Ok(false),
    }
}

#[cfg(test)]
#[path = "variable_test.rs"]
mod tests;
