//! The variable collection: satisfaction, ordering, merge, overrides,
//! validation and filtering.

use crate::error::{CoreError, CoreResult};
use crate::needs::Need;
use crate::origin::Origin;
use crate::section::VariableSection;
use crate::value::{yaml_kind, Value};
use crate::variable::{Field, Variable, VariablePatch};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Values resolved from a collection, keyed by variable name. `None` marks a
/// declared variable with no value yet.
pub type ValueMap = BTreeMap<String, Option<Value>>;

/// Owns all sections of a spec and resolves activation, ordering, merging,
/// overrides and validation across them.
///
/// Collections are built once per spec source; merges and filters produce
/// new collections, while `apply_defaults` mutates values in place.
#[derive(Debug, Clone)]
pub struct VariableCollection {
    sections: Vec<VariableSection>,
    /// name -> (section index, variable index), for O(1) lookup
    index: HashMap<String, (usize, usize)>,
}

impl VariableCollection {
    /// Build a collection from a spec mapping of section key -> section body.
    ///
    /// Non-mapping section bodies are skipped (an empty section in YAML
    /// parses as null); everything else is validated structurally, and
    /// section dependencies are checked for legacy cycles.
    pub fn from_spec(spec: &serde_yaml::Mapping, origin: Origin) -> CoreResult<Self> {
        let mut sections = Vec::new();
        for (key, body) in spec {
            let key = match key {
                serde_yaml::Value::String(s) => s.as_str(),
                other => {
                    return Err(CoreError::SpecStructure {
                        message: format!(
                            "section keys must be strings, got {}",
                            yaml_kind(other)
                        ),
                    })
                }
            };
            match body {
                serde_yaml::Value::Mapping(data) => {
                    sections.push(VariableSection::from_mapping(key, data, origin)?);
                }
                _ => {
                    log::debug!("Skipping section '{key}': body is not a mapping");
                }
            }
        }

        let collection = Self::build(sections)?;
        collection.validate_dependencies()?;
        Ok(collection)
    }

    /// Like [`from_spec`](Self::from_spec), accepting the spec as a generic
    /// YAML value. Null or absent specs produce an empty collection.
    pub fn from_spec_value(spec: &serde_yaml::Value, origin: Origin) -> CoreResult<Self> {
        match spec {
            serde_yaml::Value::Null => Self::build(Vec::new()),
            serde_yaml::Value::Mapping(m) => Self::from_spec(m, origin),
            other => Err(CoreError::SpecStructure {
                message: format!("spec must be a mapping, got {}", yaml_kind(other)),
            }),
        }
    }

    /// Assemble a collection from parsed sections, enforcing the
    /// unique-variable-names invariant and building the lookup index.
    fn build(sections: Vec<VariableSection>) -> CoreResult<Self> {
        let mut seen: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for section in &sections {
            for variable in &section.variables {
                seen.entry(variable.name.as_str())
                    .or_default()
                    .push(section.key.as_str());
            }
        }
        let duplicates: Vec<String> = seen
            .iter()
            .filter(|(_, sections)| sections.len() > 1)
            .map(|(name, sections)| format!("  - '{}' appears in sections: {}", name, sections.join(", ")))
            .collect();
        if !duplicates.is_empty() {
            return Err(CoreError::DuplicateVariables {
                details: duplicates.join("\n"),
            });
        }

        let mut collection = VariableCollection {
            sections,
            index: HashMap::new(),
        };
        collection.rebuild_index();
        Ok(collection)
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (si, section) in self.sections.iter().enumerate() {
            for (vi, variable) in section.variables.iter().enumerate() {
                self.index.insert(variable.name.clone(), (si, vi));
            }
        }
    }

    /// Warn about dangling references and reject legacy section cycles.
    ///
    /// Missing references are tolerated: a later merge may supply them, and
    /// the runtime satisfaction checks handle absence gracefully.
    fn validate_dependencies(&self) -> CoreResult<()> {
        for section in &self.sections {
            for need in &section.needs {
                if need.is_legacy() {
                    if self.section(&need.subject).is_none() {
                        log::warn!(
                            "Section '{}' depends on '{}', but '{}' does not exist. Ignoring this dependency.",
                            section.key,
                            need.subject,
                            need.subject
                        );
                    }
                } else if !self.index.contains_key(&need.subject) {
                    log::debug!(
                        "Section '{}' has need '{need}', but variable '{}' not found (might be added during merge)",
                        section.key,
                        need.subject
                    );
                }
            }
            for variable in &section.variables {
                for need in &variable.needs {
                    if !need.is_legacy() && !self.index.contains_key(&need.subject) {
                        log::debug!(
                            "Variable '{}' has need '{need}', but variable '{}' not found (might be added during merge)",
                            variable.name,
                            need.subject
                        );
                    }
                }
            }
        }
        self.check_section_cycles()
    }

    /// Cycle detection over the legacy section-reference graph.
    fn check_section_cycles(&self) -> CoreResult<()> {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();
        for section in &self.sections {
            let idx = graph.add_node(section.key.as_str());
            nodes.insert(section.key.as_str(), idx);
        }
        for section in &self.sections {
            for need in &section.needs {
                if need.is_legacy() {
                    if let Some(&dep) = nodes.get(need.subject.as_str()) {
                        // Edge from dependency to dependent
                        graph.add_edge(dep, nodes[section.key.as_str()], ());
                    }
                }
            }
        }

        match toposort(&graph, None) {
            Ok(_) => Ok(()),
            Err(cycle) => {
                let start = cycle.node_id();
                let mut path: Vec<String> = vec![graph[start].to_string()];
                let mut visited = HashSet::new();
                visited.insert(start);
                let mut current = start;
                while let Some(edge) = graph.edges(current).next() {
                    let target = edge.target();
                    path.push(graph[target].to_string());
                    if target == start || visited.contains(&target) {
                        break;
                    }
                    visited.insert(target);
                    current = target;
                }
                Err(CoreError::CircularDependency {
                    cycle: path.join(" -> "),
                })
            }
        }
    }

    pub fn sections(&self) -> &[VariableSection] {
        &self.sections
    }

    pub fn section(&self, key: &str) -> Option<&VariableSection> {
        self.sections.iter().find(|s| s.key == key)
    }

    pub fn has_sections(&self) -> bool {
        !self.sections.is_empty()
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        let &(si, vi) = self.index.get(name)?;
        Some(&self.sections[si].variables[vi])
    }

    pub fn variable_mut(&mut self, name: &str) -> Option<&mut Variable> {
        let &(si, vi) = self.index.get(name)?;
        Some(&mut self.sections[si].variables[vi])
    }

    /// All variable names across all sections.
    pub fn all_variable_names(&self) -> HashSet<String> {
        self.index.keys().cloned().collect()
    }

    /// Check one dependency condition against the current state.
    ///
    /// Legacy form: the referenced section must exist (missing sections are
    /// reported and unsatisfied) and be enabled. Variable form: a missing
    /// variable is deliberately treated as satisfied so module specs can
    /// reference variables a template adds later.
    pub fn is_need_satisfied(&self, need: &Need) -> bool {
        let Some(expected) = &need.expected else {
            return match self.section(&need.subject) {
                Some(section) => section.is_enabled(),
                None => {
                    log::warn!("Need references missing section '{}'", need.subject);
                    false
                }
            };
        };

        let Some(variable) = self.variable(&need.subject) else {
            log::debug!(
                "Need '{need}' references missing variable '{}' - treating as satisfied",
                need.subject
            );
            return true;
        };

        let actual = match variable.typed_value() {
            Ok(value) => value,
            Err(e) => {
                log::debug!("Failed to evaluate need '{need}': {e}");
                return false;
            }
        };

        let mut matches = false;
        for candidate in expected {
            let converted = match variable.convert(&Value::Str(candidate.clone())) {
                Ok(value) => value,
                Err(e) => {
                    log::debug!("Failed to evaluate need '{need}': {e}");
                    return false;
                }
            };
            if values_match(variable, actual.as_ref(), &converted) {
                matches = true;
                break;
            }
        }

        if need.positive {
            matches
        } else {
            !matches
        }
    }

    /// True iff every entry in the section's needs holds.
    pub fn is_section_satisfied(&self, key: &str) -> bool {
        let Some(section) = self.section(key) else {
            return false;
        };
        section.needs.iter().all(|need| {
            let satisfied = self.is_need_satisfied(need);
            if !satisfied {
                log::debug!("Section '{key}' need '{need}' is not satisfied");
            }
            satisfied
        })
    }

    /// True iff every entry in the variable's own needs holds.
    pub fn is_variable_satisfied(&self, name: &str) -> bool {
        let Some(variable) = self.variable(name) else {
            return false;
        };
        variable.needs.iter().all(|need| {
            let satisfied = self.is_need_satisfied(need);
            if !satisfied {
                log::debug!("Variable '{name}' need '{need}' is not satisfied");
            }
            satisfied
        })
    }

    /// Force bool variables in disabled or unsatisfied contexts to false so
    /// stale toggles don't leak into rendered output. CLI-origin values are
    /// left alone; `validate_all` rejects those with a proper error instead.
    /// Returns the names of the variables that were reset.
    pub fn reset_disabled_bool_variables(&mut self) -> Vec<String> {
        let mut to_reset: Vec<(usize, usize)> = Vec::new();
        for (si, section) in self.sections.iter().enumerate() {
            let section_satisfied = self.is_section_satisfied(&section.key);
            let enabled = section.is_enabled();
            for (vi, variable) in section.variables.iter().enumerate() {
                if !variable.var_type.is_bool() {
                    continue;
                }
                let var_satisfied = self.is_variable_satisfied(&variable.name);
                if (!section_satisfied || !enabled || !var_satisfied)
                    && variable.value != Some(Value::Bool(false))
                    && variable.origin != Origin::Cli
                {
                    to_reset.push((si, vi));
                }
            }
        }

        let mut reset = Vec::new();
        for (si, vi) in to_reset {
            let variable = &mut self.sections[si].variables[vi];
            if variable.pre_reset_value.is_none() {
                variable.pre_reset_value = variable.value.clone();
            }
            variable.value = Some(Value::Bool(false));
            reset.push(variable.name.clone());
        }
        if !reset.is_empty() {
            log::debug!("Reset {} disabled bool variables: {}", reset.len(), reset.join(", "));
        }
        reset
    }

    /// Order sections for display and prompting:
    ///
    /// 1. Dependencies before dependents (stable Kahn over legacy section
    ///    references; declaration order on ties; declaration order with a
    ///    warning when a cycle survives a merge).
    /// 2. Enabled-and-satisfied sections before disabled/unsatisfied ones,
    ///    preserving relative order inside each group.
    /// 3. Variables inside each section sorted by intra-section needs.
    pub fn sort_sections(&mut self) {
        let key_position: HashMap<&str, usize> = self
            .sections
            .iter()
            .enumerate()
            .map(|(i, s)| (s.key.as_str(), i))
            .collect();

        let mut deps: Vec<Vec<usize>> = vec![Vec::new(); self.sections.len()];
        for (i, section) in self.sections.iter().enumerate() {
            for need in &section.needs {
                if !need.is_legacy() {
                    continue;
                }
                if let Some(&j) = key_position.get(need.subject.as_str()) {
                    if j != i && !deps[i].contains(&j) {
                        deps[i].push(j);
                    }
                }
            }
        }

        let (mut order, had_cycle) = topo_order(&deps);
        if had_cycle {
            let placed: HashSet<usize> = order.iter().copied().collect();
            let stuck: Vec<&str> = (0..self.sections.len())
                .filter(|i| !placed.contains(i))
                .map(|i| self.sections[i].key.as_str())
                .collect();
            log::warn!(
                "Section ordering incomplete - circular dependency among: {}. Using declaration order.",
                stuck.join(", ")
            );
            order = (0..self.sections.len()).collect();
        }

        // Stable partition: enabled + satisfied first
        let priority: Vec<usize> = order
            .iter()
            .map(|&i| {
                let section = &self.sections[i];
                if section.is_enabled() && self.is_section_satisfied(&section.key) {
                    0
                } else {
                    1
                }
            })
            .collect();
        let mut keyed: Vec<(usize, usize)> = priority.into_iter().zip(order).collect();
        keyed.sort_by_key(|&(priority, _)| priority);

        let mut slots: Vec<Option<VariableSection>> =
            std::mem::take(&mut self.sections).into_iter().map(Some).collect();
        self.sections = keyed
            .into_iter()
            .map(|(_, i)| slots[i].take().expect("each index appears once"))
            .collect();

        for section in &mut self.sections {
            section.sort_variables();
        }
        self.rebuild_index();
    }

    /// Merge a higher-precedence collection into this one, producing a new
    /// collection.
    ///
    /// Fields explicitly supplied by `other` overwrite the base (an explicit
    /// null clears); unsupplied fields are left untouched. Sections and
    /// variables that exist only in `other` are adopted wholesale with
    /// `origin` stamped on their variables. Dependencies are revalidated
    /// afterwards, since a merge can resolve dangling references or
    /// introduce new cycles.
    pub fn merge(&self, other: &VariableCollection, origin: Origin) -> CoreResult<VariableCollection> {
        let mut sections = Vec::new();
        for section in &self.sections {
            match other.section(&section.key) {
                Some(other_section) => {
                    sections.push(merge_sections(section, other_section, origin)?)
                }
                None => sections.push(section.clone()),
            }
        }
        for other_section in &other.sections {
            if self.section(&other_section.key).is_none() {
                sections.push(other_section.clone_with_origin(Some(origin)));
            }
        }

        log::debug!(
            "Merged {} base sections with {} override sections into {}",
            self.sections.len(),
            other.sections.len(),
            sections.len()
        );

        let merged = Self::build(sections)?;
        merged.validate_dependencies()?;
        Ok(merged)
    }

    /// Layer runtime value overrides onto the collection.
    ///
    /// Unknown names are skipped with a log line; overrides whose needs are
    /// currently unsatisfied are stored anyway (they may become relevant)
    /// with a warning. Conversion failures are collected and raised as one
    /// batch after every entry has been attempted; successfully applied
    /// entries are not rolled back.
    pub fn apply_defaults(
        &mut self,
        values: &[(String, Value)],
        origin: Origin,
    ) -> CoreResult<Vec<String>> {
        let mut applied = Vec::new();
        let mut errors = Vec::new();

        for (name, raw) in values {
            let Some(&(si, vi)) = self.index.get(name) else {
                log::debug!("Override for '{name}' not applicable to this template (variable not defined)");
                continue;
            };

            if !self.is_variable_satisfied(name) {
                let unmet: Vec<String> = self.sections[si].variables[vi]
                    .needs
                    .iter()
                    .filter(|need| !self.is_need_satisfied(need))
                    .map(ToString::to_string)
                    .collect();
                let needs_str = if unmet.is_empty() {
                    "unknown".to_string()
                } else {
                    unmet.join(", ")
                };
                log::warn!(
                    "Setting '{name}' via {origin} will have no effect - needs not satisfied: {needs_str}"
                );
            }

            let variable = &mut self.sections[si].variables[vi];

            // Snapshot the value the first time the config layer touches it,
            // for later original -> new display
            if origin == Origin::Config && !variable.original_recorded {
                variable.original_value = variable.value.clone();
                variable.original_recorded = true;
            }

            match variable.convert(raw) {
                Ok(converted) => {
                    variable.value = Some(converted);
                    variable.origin = origin;
                    applied.push(name.clone());
                }
                Err(e) => {
                    let message = format!("invalid value for '{name}': {raw} - {e}");
                    log::error!("{message}");
                    errors.push(message);
                }
            }
        }

        if !errors.is_empty() {
            return Err(CoreError::Overrides { errors });
        }
        Ok(applied)
    }

    /// Validate the whole collection, collecting all failures into one
    /// batch error.
    ///
    /// A truthy bool forced via the CLI in a disabled or unsatisfied context
    /// is a hard error: explicit intent must be rejected loudly rather than
    /// silently discarded. Beyond that, every variable in an enabled and
    /// satisfied section must have a value if required, and non-bool values
    /// must convert and be non-empty.
    pub fn validate_all(&self) -> CoreResult<()> {
        let mut errors = Vec::new();
        self.validate_cli_bool_variables(&mut errors);
        self.validate_section_variables(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            let error = CoreError::Validation { errors };
            log::error!("{error}");
            Err(error)
        }
    }

    fn validate_cli_bool_variables(&self, errors: &mut Vec<String>) {
        for section in &self.sections {
            let section_satisfied = self.is_section_satisfied(&section.key);
            let enabled = section.is_enabled();

            for variable in &section.variables {
                if !variable.var_type.is_bool() || variable.origin != Origin::Cli {
                    continue;
                }
                if !matches!(variable.typed_value(), Ok(Some(Value::Bool(true)))) {
                    continue;
                }
                let var_satisfied = self.is_variable_satisfied(&variable.name);
                if section_satisfied && enabled && var_satisfied {
                    continue;
                }

                let mut unmet: BTreeSet<String> = BTreeSet::new();
                if !section_satisfied {
                    unmet.extend(
                        section
                            .needs
                            .iter()
                            .filter(|need| !self.is_need_satisfied(need))
                            .map(ToString::to_string),
                    );
                }
                if !var_satisfied {
                    unmet.extend(
                        variable
                            .needs
                            .iter()
                            .filter(|need| !self.is_need_satisfied(need))
                            .map(ToString::to_string),
                    );
                }
                let needs_str = if unmet.is_empty() {
                    "dependencies not satisfied".to_string()
                } else {
                    unmet.into_iter().collect::<Vec<_>>().join(", ")
                };
                errors.push(format!(
                    "{}.{} (set via CLI to true but requires: {})",
                    section.key, variable.name, needs_str
                ));
            }
        }
    }

    fn validate_section_variables(&self, errors: &mut Vec<String>) {
        for section in &self.sections {
            if !self.is_section_satisfied(&section.key) {
                log::debug!(
                    "Skipping validation for section '{}' - dependencies not satisfied",
                    section.key
                );
                continue;
            }
            if !section.is_enabled() {
                log::debug!("Section '{}' is disabled - skipping all variables", section.key);
                continue;
            }

            for variable in &section.variables {
                // Empty autogenerated variables are filled at render time
                if variable.autogenerated
                    && variable.value.as_ref().map_or(true, Value::is_empty)
                {
                    continue;
                }
                if !self.is_variable_satisfied(&variable.name) {
                    continue;
                }

                match &variable.value {
                    None => {
                        if variable.is_required() {
                            errors.push(format!(
                                "{}.{} (required from {} - no default provided)",
                                section.key, variable.name, variable.origin
                            ));
                        }
                    }
                    Some(raw) => match variable.convert(raw) {
                        Ok(typed) => {
                            if !variable.var_type.is_bool() && typed.is_empty() {
                                let prefix = format!("{}.{}", section.key, variable.name);
                                if variable.is_required() {
                                    errors.push(format!("{prefix} (required - cannot be empty)"));
                                } else {
                                    errors.push(format!("{prefix} (empty)"));
                                }
                            }
                        }
                        Err(e) => {
                            errors.push(format!(
                                "{}.{} (invalid format: {e})",
                                section.key, variable.name
                            ));
                        }
                    },
                }
            }
        }
    }

    /// New collection retaining only the variables in `used` (plus all
    /// sensitive variables when `keep_sensitive`). Sections left empty are
    /// dropped, and toggles whose variable was dropped are cleared.
    pub fn filter_to_used(&self, used: &HashSet<String>, keep_sensitive: bool) -> VariableCollection {
        let mut sections = Vec::new();
        for section in &self.sections {
            let mut filtered = section.clone();
            filtered
                .variables
                .retain(|v| used.contains(&v.name) || (keep_sensitive && v.sensitive));
            if filtered.variables.is_empty() {
                continue;
            }
            if let Some(toggle) = filtered.toggle.clone() {
                if filtered.variable(&toggle).is_none() {
                    filtered.toggle = None;
                }
            }
            filtered.refresh_toggle_flags();
            sections.push(filtered);
        }

        let mut collection = VariableCollection {
            sections,
            index: HashMap::new(),
        };
        collection.rebuild_index();
        collection
    }

    /// All variables with their converted values.
    pub fn get_all_values(&self) -> CoreResult<ValueMap> {
        let mut values = ValueMap::new();
        for section in &self.sections {
            for variable in &section.variables {
                values.insert(variable.name.clone(), variable.typed_value()?);
            }
        }
        Ok(values)
    }

    /// Values from enabled sections whose needs are satisfied. A disabled or
    /// unsatisfied section contributes no values at all.
    pub fn get_satisfied_values(&self) -> CoreResult<ValueMap> {
        let mut values = ValueMap::new();
        for section in &self.sections {
            if !self.is_section_satisfied(&section.key) {
                log::debug!(
                    "Excluding variables from section '{}' - dependencies not satisfied",
                    section.key
                );
                continue;
            }
            if !section.is_enabled() {
                log::debug!("Section '{}' is disabled - excluding all variables", section.key);
                continue;
            }
            for variable in &section.variables {
                values.insert(variable.name.clone(), variable.typed_value()?);
            }
        }
        Ok(values)
    }

    /// Sensitive variables that currently hold a truthy value.
    pub fn get_sensitive_values(&self) -> BTreeMap<String, Value> {
        let mut values = BTreeMap::new();
        for section in &self.sections {
            for variable in &section.variables {
                if let (true, Some(value)) = (variable.sensitive, &variable.value) {
                    if value.is_truthy() {
                        values.insert(variable.name.clone(), value.clone());
                    }
                }
            }
        }
        values
    }
}

/// Compare a variable's current value against one expected candidate.
/// Bool variables compare as booleans (an unset value counts as false);
/// everything else compares by string form, and an unset value never
/// matches.
fn values_match(variable: &Variable, actual: Option<&Value>, expected: &Value) -> bool {
    if variable.var_type.is_bool() {
        let actual = actual.and_then(Value::as_bool).unwrap_or(false);
        let expected = expected.as_bool().unwrap_or(false);
        return actual == expected;
    }
    match actual {
        Some(actual) => actual.to_string() == expected.to_string(),
        None => false,
    }
}

fn merge_sections(
    base: &VariableSection,
    other: &VariableSection,
    origin: Origin,
) -> CoreResult<VariableSection> {
    let mut merged = base.clone();

    // Section metadata: explicit fields win, explicit null/empty clears
    if other.explicit.contains(&Field::Title) {
        merged.title = other.title.clone();
    }
    if other.explicit.contains(&Field::Description) {
        merged.description = other.description.clone();
    }
    if other.explicit.contains(&Field::Toggle) {
        merged.toggle = other.toggle.clone();
    }
    if other.explicit.contains(&Field::Needs) {
        merged.needs = other.needs.clone();
    }
    merged.explicit.extend(other.explicit.iter().copied());

    for other_var in &other.variables {
        if merged.variable(&other_var.name).is_some() {
            let mut patch = VariablePatch {
                origin: Some(origin),
                ..Default::default()
            };
            if other_var.is_explicit(Field::Type) || other_var.is_explicit(Field::Options) {
                patch.var_type = Some(other_var.var_type.clone());
            }
            if other_var.is_explicit(Field::Description) {
                patch.description = Some(other_var.description.clone());
            }
            if other_var.is_explicit(Field::Sensitive) {
                patch.sensitive = Some(other_var.sensitive);
            }
            if other_var.is_explicit(Field::Autogenerated) {
                patch.autogenerated = Some(other_var.autogenerated);
            }
            if other_var.is_explicit(Field::AutogeneratedLength) {
                patch.autogenerated_length = Some(other_var.autogenerated_length);
            }
            if other_var.is_explicit(Field::AutogeneratedBase64) {
                patch.autogenerated_base64 = Some(other_var.autogenerated_base64);
            }
            if other_var.is_explicit(Field::Needs) {
                patch.needs = Some(other_var.needs.clone());
            }
            if other_var.is_explicit(Field::Default) {
                patch.default = Some(other_var.default.clone());
            }
            if other_var.is_explicit(Field::Value) || other_var.is_explicit(Field::Default) {
                patch.value = Some(other_var.value.clone());
            }

            let base_var = merged.variable(&other_var.name).expect("checked above");
            let merged_var = base_var.with_patch(&patch);
            *merged.variable_mut(&other_var.name).expect("checked above") = merged_var;
        } else {
            let mut adopted = other_var.clone();
            adopted.origin = origin;
            merged.variables.push(adopted);
        }
    }

    merged.validate_toggle()?;
    Ok(merged)
}

/// Stable Kahn's algorithm over index-based dependency lists. Returns the
/// order and whether a cycle prevented completing it (in which case the
/// returned order covers only the acyclic prefix).
fn topo_order(deps: &[Vec<usize>]) -> (Vec<usize>, bool) {
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

    let had_cycle = result.len() != n;
    (result, had_cycle)
}

#[cfg(test)]
#[path = "collection_test.rs"]
mod tests;
