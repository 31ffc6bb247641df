//! Rendering a template tree against resolved values

use crate::diagnostics::{extract_error_context, suggestions_for_error, CONTEXT_SIZE};
use crate::error::{RenderContext, TemplateError, TemplateResult};
use crate::files::{loader_name, FileKind, TemplateFile};
use crate::template::Template;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bf_core::{Value, ValueMap, VariableCollection};
use minijinja::ErrorKind;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng, RngCore};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// The result of rendering a template: output-relative paths with their
/// content, plus the flattened value map actually used (autogenerated
/// values included).
#[derive(Debug)]
pub struct RenderOutput {
    pub files: Vec<(PathBuf, String)>,
    pub values: ValueMap,
}

/// Render every file of the template against the collection's resolved
/// values.
///
/// Templated files render through the engine and are post-processed;
/// rendered files that end up empty (or a bare document separator) are
/// dropped. Static files are always kept, even when empty. The first engine
/// failure aborts with a structured render error.
pub fn render_template(
    template: &Template,
    collection: &VariableCollection,
) -> TemplateResult<RenderOutput> {
    let mut values = collection.get_satisfied_values()?;
    generate_autogenerated_values(collection, &mut values);
    log::debug!(
        "Rendering template '{}' with variables: {:?}",
        template.id,
        values.keys().collect::<Vec<_>>()
    );

    let env = template.environment();
    let available: BTreeSet<String> = values.keys().cloned().collect();
    let json_context: std::collections::BTreeMap<&str, serde_json::Value> = values
        .iter()
        .map(|(name, value)| (name.as_str(), value_to_json(value.as_ref())))
        .collect();
    let context = minijinja::Value::from_serialize(&json_context);

    let mut rendered_files: Vec<(PathBuf, String)> = Vec::new();
    let mut skipped: Vec<String> = Vec::new();

    for file in template.files() {
        match file.kind {
            FileKind::Templated => {
                let name = loader_name(file);
                let result = env
                    .get_template(&name)
                    .and_then(|t| t.render(&context));
                match result {
                    Ok(content) => {
                        let content = sanitize_content(&content);
                        let stripped = content.trim();
                        if !stripped.is_empty() && stripped != "---" {
                            rendered_files.push((file.output_path.clone(), content));
                        } else {
                            skipped.push(file.output_path.display().to_string());
                        }
                    }
                    Err(error) => {
                        return Err(render_error(template, file, &env, error, &available))
                    }
                }
            }
            FileKind::Static => {
                let path = template.template_dir.join(&file.relative_path);
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    TemplateError::Render {
                        message: format!("Error reading static file: {e}"),
                        context: RenderContext {
                            file_path: file.relative_path.display().to_string(),
                            suggestions: vec![
                                "Check that the file exists and has read permissions".to_string(),
                            ],
                            ..Default::default()
                        },
                    }
                })?;
                rendered_files.push((file.output_path.clone(), content));
            }
        }
    }

    if !skipped.is_empty() {
        log::debug!("Skipped {} empty file(s): {}", skipped.len(), skipped.join(", "));
    }

    Ok(RenderOutput {
        files: rendered_files,
        values,
    })
}

/// Convert a resolved value to JSON for the render context. A declared but
/// unset variable is passed as null, not dropped.
fn value_to_json(value: Option<&Value>) -> serde_json::Value {
    match value {
        None => serde_json::Value::Null,
        Some(Value::Bool(b)) => serde_json::Value::Bool(*b),
        Some(Value::Int(i)) => serde_json::Value::Number((*i).into()),
        Some(Value::Float(f)) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Some(Value::Str(s)) => serde_json::Value::String(s.clone()),
    }
}

/// Synthesize values for autogenerated variables that are still empty.
/// Generated values live only in the returned value map; nothing persists
/// between renders.
fn generate_autogenerated_values(collection: &VariableCollection, values: &mut ValueMap) {
    for section in collection.sections() {
        for variable in &section.variables {
            if !variable.autogenerated {
                continue;
            }
            if !variable.value.as_ref().map_or(true, Value::is_empty) {
                continue;
            }
            let generated = if variable.autogenerated_base64 {
                // Length counts random bytes, not the encoded string
                let mut bytes = vec![0u8; variable.autogenerated_length];
                thread_rng().fill_bytes(&mut bytes);
                STANDARD.encode(&bytes)
            } else {
                thread_rng()
                    .sample_iter(&Alphanumeric)
                    .take(variable.autogenerated_length)
                    .map(char::from)
                    .collect()
            };
            log::debug!(
                "Auto-generated value for variable '{}' (length: {})",
                variable.name,
                variable.autogenerated_length
            );
            values.insert(variable.name.clone(), Some(Value::Str(generated)));
        }
    }
}

/// Collapse repeated blank lines, strip trailing whitespace per line, and
/// normalize to a single trailing newline.
fn sanitize_content(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    let mut sanitized: Vec<&str> = Vec::new();
    let mut prev_blank = false;
    for line in content.split('\n') {
        let line = line.trim_end();
        let blank = line.is_empty();
        if blank && prev_blank {
            continue;
        }
        sanitized.push(line);
        prev_blank = blank;
    }

    let joined = sanitized.join("\n");
    let trimmed = joined.trim_start_matches('\n').trim_end_matches('\n');
    format!("{trimmed}\n")
}

/// Turn an engine exception into a structured render error with location,
/// source context, and category-keyed suggestions.
fn render_error(
    template: &Template,
    file: &TemplateFile,
    env: &minijinja::Environment<'_>,
    error: minijinja::Error,
    available: &BTreeSet<String>,
) -> TemplateError {
    let line = error.line();
    let source_path = template.template_dir.join(&file.relative_path);
    let context_lines = line
        .map(|l| extract_error_context(&source_path, l, CONTEXT_SIZE))
        .unwrap_or_default();

    // For undefined errors the failing names are the ones this file
    // references but the context lacks
    let undefined: Vec<String> = if matches!(error.kind(), ErrorKind::UndefinedError) {
        env.get_template(&loader_name(file))
            .map(|t| {
                let mut missing: Vec<String> = t
                    .undeclared_variables(false)
                    .into_iter()
                    .filter(|name| !available.contains(name))
                    .collect();
                missing.sort();
                missing
            })
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    let suggestions = suggestions_for_error(&error, &undefined, available);
    let message = match error.kind() {
        ErrorKind::UndefinedError => format!("Undefined variable: {error}"),
        ErrorKind::SyntaxError => format!("Template syntax error: {error}"),
        ErrorKind::TemplateNotFound => format!("Template file not found: {error}"),
        _ => error.to_string(),
    };
    log::error!(
        "Error rendering template file {}: {message}",
        file.relative_path.display()
    );

    TemplateError::Render {
        message,
        context: RenderContext {
            file_path: file.relative_path.display().to_string(),
            line,
            column: None,
            context_lines,
            suggestions,
        },
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
