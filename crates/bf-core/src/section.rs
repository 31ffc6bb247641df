//! Named, toggle-gated groups of variables

use crate::error::{CoreError, CoreResult};
use crate::needs::Need;
use crate::origin::Origin;
use crate::value::yaml_kind;
use crate::variable::{Field, FieldSet, Variable};
use std::collections::HashMap;

/// An ordered, named group of variables sharing a toggle and section-level
/// activation conditions.
#[derive(Debug, Clone)]
pub struct VariableSection {
    pub key: String,
    pub title: String,
    pub description: Option<String>,
    /// Name of a bool variable in this section gating the whole section
    pub toggle: Option<String>,
    pub needs: Vec<Need>,
    pub variables: Vec<Variable>,
    pub(crate) explicit: FieldSet,
}

impl VariableSection {
    /// Parse a section (including its `vars`) from a spec mapping.
    pub fn from_mapping(
        key: &str,
        data: &serde_yaml::Mapping,
        origin: Origin,
    ) -> CoreResult<VariableSection> {
        let mut explicit = FieldSet::new();

        let title = match data.get("title") {
            Some(serde_yaml::Value::String(s)) => {
                explicit.insert(Field::Title);
                s.clone()
            }
            Some(other) => {
                return Err(CoreError::SpecStructure {
                    message: format!(
                        "section '{key}': 'title' must be a string, got {}",
                        yaml_kind(other)
                    ),
                })
            }
            None => title_from_key(key),
        };

        let description = match data.get("description") {
            Some(serde_yaml::Value::String(s)) => {
                explicit.insert(Field::Description);
                Some(s.clone())
            }
            Some(serde_yaml::Value::Null) => {
                explicit.insert(Field::Description);
                None
            }
            Some(other) => {
                return Err(CoreError::SpecStructure {
                    message: format!(
                        "section '{key}': 'description' must be a string, got {}",
                        yaml_kind(other)
                    ),
                })
            }
            None => None,
        };

        let toggle = match data.get("toggle") {
            Some(serde_yaml::Value::String(s)) => {
                explicit.insert(Field::Toggle);
                Some(s.clone())
            }
            Some(serde_yaml::Value::Null) => {
                explicit.insert(Field::Toggle);
                None
            }
            Some(other) => {
                return Err(CoreError::SpecStructure {
                    message: format!(
                        "section '{key}': 'toggle' must be a string, got {}",
                        yaml_kind(other)
                    ),
                })
            }
            None => None,
        };

        let needs = match data.get("needs") {
            Some(raw) => {
                explicit.insert(Field::Needs);
                Need::parse_entry(raw).map_err(|e| CoreError::SpecStructure {
                    message: format!("section '{key}': {e}"),
                })?
            }
            None => Vec::new(),
        };

        let mut section = VariableSection {
            key: key.to_string(),
            title,
            description,
            toggle,
            needs,
            variables: Vec::new(),
            explicit,
        };

        // An empty or null vars block is tolerated
        match data.get("vars") {
            None | Some(serde_yaml::Value::Null) => {}
            Some(serde_yaml::Value::Mapping(vars)) => {
                for (var_key, var_data) in vars {
                    let name = match var_key {
                        serde_yaml::Value::String(s) => s.as_str(),
                        other => {
                            return Err(CoreError::SpecStructure {
                                message: format!(
                                    "section '{key}': variable names must be strings, got {}",
                                    yaml_kind(other)
                                ),
                            })
                        }
                    };
                    let var_mapping = match var_data {
                        serde_yaml::Value::Mapping(m) => m.clone(),
                        serde_yaml::Value::Null => serde_yaml::Mapping::new(),
                        other => {
                            return Err(CoreError::SpecStructure {
                                message: format!(
                                    "variable '{name}' in section '{key}' must be a mapping, got {}",
                                    yaml_kind(other)
                                ),
                            })
                        }
                    };
                    if section.variable(name).is_some() {
                        return Err(CoreError::SpecStructure {
                            message: format!("duplicate variable '{name}' in section '{key}'"),
                        });
                    }
                    section
                        .variables
                        .push(Variable::from_mapping(name, &var_mapping, origin)?);
                }
            }
            Some(other) => {
                return Err(CoreError::SpecStructure {
                    message: format!(
                        "section '{key}': 'vars' must be a mapping, got {}",
                        yaml_kind(other)
                    ),
                })
            }
        }

        section.validate_toggle()?;
        Ok(section)
    }

    /// Look up a variable by name.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn variable_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.variables.iter_mut().find(|v| v.name == name)
    }

    /// True when no toggle is set, or the toggle variable's converted value
    /// is true. A missing toggle variable counts as enabled; a value that
    /// fails conversion counts as disabled.
    pub fn is_enabled(&self) -> bool {
        let Some(toggle) = &self.toggle else {
            return true;
        };
        let Some(toggle_var) = self.variable(toggle) else {
            return true;
        };
        match &toggle_var.value {
            Some(raw) => toggle_var
                .convert(raw)
                .ok()
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            None => false,
        }
    }

    /// Deep copy, optionally stamping a new origin on every variable.
    pub fn clone_with_origin(&self, origin: Option<Origin>) -> VariableSection {
        let mut cloned = self.clone();
        if let Some(origin) = origin {
            for variable in &mut cloned.variables {
                variable.origin = origin;
            }
        }
        cloned
    }

    /// Validate the toggle invariant: the referenced variable must exist and
    /// be bool-typed. A toggle whose variable is gone (e.g. dropped by
    /// filtering) is cleared rather than treated as an error.
    pub(crate) fn validate_toggle(&mut self) -> CoreResult<()> {
        let Some(toggle) = self.toggle.clone() else {
            self.refresh_toggle_flags();
            return Ok(());
        };
        match self.variable(&toggle).map(|v| v.var_type.clone()) {
            None => {
                self.toggle = None;
            }
            Some(var_type) if !var_type.is_bool() => {
                return Err(CoreError::ToggleNotBool {
                    section: self.key.clone(),
                    toggle,
                    var_type: var_type.tag().to_string(),
                });
            }
            Some(_) => {}
        }
        self.refresh_toggle_flags();
        Ok(())
    }

    pub(crate) fn refresh_toggle_flags(&mut self) {
        let toggle = self.toggle.clone();
        for variable in &mut self.variables {
            variable.is_toggle = toggle.as_deref() == Some(variable.name.as_str());
        }
    }

    /// Sort variables so intra-section dependencies come before their
    /// dependents, preserving declaration order within each dependency
    /// level. Dependencies on variables outside this section do not affect
    /// the order. Falls back to appending the remainder in declaration order
    /// when the intra-section needs form a cycle.
    pub fn sort_variables(&mut self) {
        if self.variables.len() < 2 {
            return;
        }

        let names: Vec<String> = self.variables.iter().map(|v| v.name.clone()).collect();
        let position: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();

        // deps[i] = indices of in-section variables that variable i needs
        let mut deps: Vec<Vec<usize>> = vec![Vec::new(); names.len()];
        for (i, variable) in self.variables.iter().enumerate() {
            for need in &variable.needs {
                if let Some(&j) = position.get(need.subject.as_str()) {
                    if j != i && !deps[i].contains(&j) {
                        deps[i].push(j);
                    }
                }
            }
        }

        let order = stable_kahn(&deps);
        let mut remaining: Vec<Option<Variable>> =
            std::mem::take(&mut self.variables).into_iter().map(Some).collect();
        self.variables = order
            .into_iter()
            .map(|i| remaining[i].take().expect("each index appears once"))
            .collect();
    }
}

/// Kahn's algorithm with declaration-order tie-breaking. Nodes stuck in a
/// cycle are appended at the end in declaration order.
fn stable_kahn(deps: &[Vec<usize>]) -> Vec<usize> {
    let n = deps.len();
    let mut in_degree: Vec<usize> = deps.iter().map(Vec::len).collect();
    let mut queue: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut result = Vec::with_capacity(n);

    while !queue.is_empty() {
        queue.sort_unstable();
        let current = queue.remove(0);
        result.push(current);

        for (i, node_deps) in deps.iter().enumerate() {
            if node_deps.contains(&current) {
                in_degree[i] -= 1;
                if in_degree[i] == 0 {
                    queue.push(i);
                }
            }
        }
    }

    if result.len() != n {
        let missing: Vec<usize> = (0..n).filter(|i| !result.contains(i)).collect();
        result.extend(missing);
    }
    result
}

fn title_from_key(key: &str) -> String {
    key.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "section_test.rs"]
mod tests;
