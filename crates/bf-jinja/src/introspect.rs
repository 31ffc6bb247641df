//! Template introspection: free-variable discovery and embedded defaults
//!
//! Discovery rides on the engine's own parser, so `x.a` and `x['a']` both
//! count `x` as referenced. Default harvesting is regex-based because the
//! engine exposes no filter-argument AST.

use crate::error::{TemplateError, TemplateResult};
use crate::files::{loader_name, FileKind, TemplateFile};
use bf_core::Value;
use minijinja::Environment;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Variables referenced anywhere in a template's files
#[derive(Debug, Default)]
pub struct ReferencedVariables {
    pub names: HashSet<String>,
    /// variable name -> files referencing it, for diagnostics
    pub usage: BTreeMap<String, Vec<String>>,
}

/// Parse every templated file once and collect all free variable names.
/// Parse failures are batched across files into one syntax-error report.
pub fn referenced_variables(
    env: &Environment<'_>,
    template_id: &str,
    files: &[TemplateFile],
) -> TemplateResult<ReferencedVariables> {
    let mut referenced = ReferencedVariables::default();
    let mut syntax_errors = Vec::new();

    for file in files {
        if file.kind != FileKind::Templated {
            continue;
        }
        let name = loader_name(file);
        match env.get_template(&name) {
            Ok(template) => {
                for variable in template.undeclared_variables(false) {
                    referenced
                        .usage
                        .entry(variable.clone())
                        .or_default()
                        .push(name.clone());
                    referenced.names.insert(variable);
                }
            }
            Err(e) => {
                syntax_errors.push(format!("  - {name}: {e}"));
            }
        }
    }

    if !syntax_errors.is_empty() {
        log::error!("Template syntax errors found in '{template_id}'");
        return Err(TemplateError::Syntax {
            template_id: template_id.to_string(),
            errors: syntax_errors,
        });
    }

    Ok(referenced)
}

/// A default value harvested from template content
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddedDefault {
    Scalar(Value),
    /// Keyed defaults from dict-style access: `var['key'] | default(...)`
    Keyed(BTreeMap<String, Value>),
}

/// Harvest literal defaults embedded via the `default` filter.
///
/// Handles `{{ var | default(lit) }}`, `{{ var['key'] | default(lit) }}` and
/// `{% set x = y | default(lit) %}`. Identifier-valued defaults are resolved
/// transitively through other harvested defaults and through `declared`
/// (spec-declared defaults), so chains like `set a = b | default(c)` land on
/// a concrete value when one exists.
pub fn embedded_defaults(
    sources: &[(String, String)],
    declared: &HashMap<String, Value>,
) -> BTreeMap<String, EmbeddedDefault> {
    let subscript =
        Regex::new(r#"\{\{\s*(\w+)\s*\[\s*["']([^"']+)["']\s*\]\s*\|\s*default\(([^)]+)\)\s*\}\}"#)
            .expect("static pattern");
    let scalar = Regex::new(r"\{\{\s*(\w+)\s*\|\s*default\(([^)]+)\)\s*\}\}")
        .expect("static pattern");
    let set_block = Regex::new(r"\{%\s*set\s+(\w+)\s*=\s*([^%]+?)\s*%\}").expect("static pattern");
    let piped_default =
        Regex::new(r"^(\w+)\s*\|\s*default\(([^)]+)\)$").expect("static pattern");

    let mut defaults: BTreeMap<String, EmbeddedDefault> = BTreeMap::new();

    for (_, content) in sources {
        for captures in subscript.captures_iter(content) {
            let variable = captures[1].to_string();
            let key = captures[2].to_string();
            let value = parse_literal(&captures[3]);
            let entry = defaults
                .entry(variable)
                .or_insert_with(|| EmbeddedDefault::Keyed(BTreeMap::new()));
            match entry {
                EmbeddedDefault::Keyed(map) => {
                    map.entry(key).or_insert(value);
                }
                EmbeddedDefault::Scalar(_) => {
                    // Keyed access supersedes a previously harvested scalar
                    let mut map = BTreeMap::new();
                    map.insert(key, value);
                    *entry = EmbeddedDefault::Keyed(map);
                }
            }
        }

        for captures in scalar.captures_iter(content) {
            let variable = captures[1].to_string();
            defaults
                .entry(variable)
                .or_insert_with(|| EmbeddedDefault::Scalar(parse_literal(&captures[2])));
        }

        for captures in set_block.captures_iter(content) {
            let target = captures[1].to_string();
            let Some(inner) = piped_default.captures(captures[2].trim()) else {
                continue;
            };
            let source_var = &inner[1];
            let entry = match defaults.get(source_var) {
                Some(existing) => existing.clone(),
                None => EmbeddedDefault::Scalar(parse_literal(&inner[2])),
            };
            defaults.insert(target, entry);
        }
    }

    // Follow identifier-valued defaults to the value they name
    let resolved: BTreeMap<String, EmbeddedDefault> = defaults
        .iter()
        .map(|(name, default)| {
            let resolved = match default {
                EmbeddedDefault::Scalar(value) => {
                    let mut seen = HashSet::new();
                    seen.insert(name.clone());
                    EmbeddedDefault::Scalar(resolve_reference(value, &defaults, declared, &mut seen))
                }
                keyed => keyed.clone(),
            };
            (name.clone(), resolved)
        })
        .collect();

    resolved
}

fn resolve_reference(
    value: &Value,
    defaults: &BTreeMap<String, EmbeddedDefault>,
    declared: &HashMap<String, Value>,
    seen: &mut HashSet<String>,
) -> Value {
    let Value::Str(ident) = value else {
        return value.clone();
    };
    if !is_identifier(ident) || !seen.insert(ident.clone()) {
        return value.clone();
    }
    if let Some(EmbeddedDefault::Scalar(next)) = defaults.get(ident) {
        return resolve_reference(next, defaults, declared, seen);
    }
    if let Some(declared_default) = declared.get(ident) {
        return declared_default.clone();
    }
    value.clone()
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !text.chars().next().expect("non-empty").is_ascii_digit()
}

/// Interpret a `default(...)` argument: quoted strings lose their quotes,
/// digit runs become ints, everything else stays textual.
fn parse_literal(raw: &str) -> Value {
    let trimmed = raw.trim();
    if (trimmed.starts_with('\'') && trimmed.ends_with('\'') && trimmed.len() >= 2)
        || (trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2)
    {
        return Value::Str(trimmed[1..trimmed.len() - 1].to_string());
    }
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(n) = trimmed.parse::<i64>() {
            return Value::Int(n);
        }
    }
    Value::Str(trimmed.to_string())
}

#[cfg(test)]
#[path = "introspect_test.rs"]
mod tests;
