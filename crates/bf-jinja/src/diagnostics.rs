//! Render-error diagnostics: source context windows and fix suggestions

use minijinja::ErrorKind;
use std::collections::BTreeSet;
use std::path::Path;

/// Lines of context to show around a failing line
pub const CONTEXT_SIZE: usize = 3;

/// Extract a window of source lines around an error location, with the
/// failing line marked. `line` is 1-indexed. Returns nothing when the file
/// cannot be read.
pub fn extract_error_context(path: &Path, line: usize, context_size: usize) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let lines: Vec<&str> = content.lines().collect();
    if line == 0 || line > lines.len() {
        return Vec::new();
    }

    let start = line.saturating_sub(context_size + 1);
    let end = (line + context_size).min(lines.len());

    (start..end)
        .map(|i| {
            let number = i + 1;
            let marker = if number == line { ">>>" } else { "   " };
            format!("{marker} {number:4} | {}", lines[i].trim_end())
        })
        .collect()
}

/// Close-enough variable names for a did-you-mean hint: substring matches
/// plus high-similarity candidates, best first.
pub fn fuzzy_matches(target: &str, available: &BTreeSet<String>, limit: usize) -> Vec<String> {
    let target_lower = target.to_lowercase();
    let mut scored: Vec<(bool, i64, &String)> = available
        .iter()
        .filter_map(|candidate| {
            let candidate_lower = candidate.to_lowercase();
            let substring = candidate_lower.contains(&target_lower)
                || target_lower.contains(&candidate_lower);
            let similarity = strsim::jaro_winkler(&target_lower, &candidate_lower);
            if substring || similarity >= 0.75 {
                // Invert for descending sort; substring matches rank first
                Some((!substring, -(similarity * 1000.0) as i64, candidate))
            } else {
                None
            }
        })
        .collect();
    scored.sort();
    scored
        .into_iter()
        .take(limit)
        .map(|(_, _, name)| name.clone())
        .collect()
}

/// Generate actionable suggestions for an engine error.
///
/// `undefined` carries the names this file references that are missing from
/// the render context, when the caller could determine them.
pub fn suggestions_for_error(
    error: &minijinja::Error,
    undefined: &[String],
    available: &BTreeSet<String>,
) -> Vec<String> {
    let mut suggestions = Vec::new();

    match error.kind() {
        ErrorKind::UndefinedError => {
            if undefined.is_empty() {
                suggestions.push(
                    "Check that all variables used in templates are defined in template.yaml"
                        .to_string(),
                );
                suggestions.push(
                    "Use the default filter for optional values: {{ var | default('value') }}"
                        .to_string(),
                );
            }
            for name in undefined {
                suggestions.push(format!("Variable '{name}' is not defined in the template spec"));
                let similar = fuzzy_matches(name, available, 5);
                if !similar.is_empty() {
                    suggestions.push(format!("Did you mean one of these? {}", similar.join(", ")));
                }
                suggestions.push(format!(
                    "Add '{name}' to your template.yaml spec with a default value"
                ));
                suggestions.push(format!(
                    "Or use the default filter: {{{{ {name} | default('value') }}}}"
                ));
            }
        }
        ErrorKind::SyntaxError => {
            suggestions.push("Check for syntax errors in the template".to_string());
            suggestions.push(
                "Common issues: missing {% endfor %}, {% endif %} or {% endblock %}".to_string(),
            );
            suggestions
                .push("Make sure all {{ }} and {% %} tags are properly closed".to_string());
        }
        ErrorKind::TemplateNotFound | ErrorKind::BadInclude => {
            suggestions.push("Check that the included template file exists".to_string());
            suggestions
                .push("Verify the path is relative to the template directory".to_string());
            suggestions.push(
                "Make sure the file has the .j2 extension if it is templated".to_string(),
            );
        }
        ErrorKind::UnknownFilter | ErrorKind::UnknownTest | ErrorKind::UnknownFunction => {
            suggestions.push("Check that the filter name is spelled correctly".to_string());
            suggestions.push("Verify the filter exists among the engine's built-ins".to_string());
            suggestions.push("Make sure filter arguments are properly formatted".to_string());
        }
        _ => {
            suggestions.push("Check the template syntax and variable usage".to_string());
            suggestions.push("Run with debug logging for more rendering detail".to_string());
        }
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_context_window_marks_failing_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file.j2");
        fs::write(&path, "one\ntwo\nthree\nfour\nfive\nsix\nseven\n").unwrap();

        let context = extract_error_context(&path, 4, 2);
        assert_eq!(context.len(), 5);
        assert!(context[2].starts_with(">>>"));
        assert!(context[2].contains("four"));
        assert!(context[0].contains("two"));
        assert!(context[4].contains("six"));
    }

    #[test]
    fn test_context_at_file_start() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file.j2");
        fs::write(&path, "one\ntwo\n").unwrap();

        let context = extract_error_context(&path, 1, 3);
        assert_eq!(context.len(), 2);
        assert!(context[0].starts_with(">>>"));
    }

    #[test]
    fn test_context_missing_file() {
        let context = extract_error_context(Path::new("/nonexistent/file.j2"), 1, 3);
        assert!(context.is_empty());
    }

    #[test]
    fn test_fuzzy_matches_substring_and_similarity() {
        let available: BTreeSet<String> = ["service_name", "service_port", "network_mode"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let matches = fuzzy_matches("service", &available, 5);
        assert!(matches.contains(&"service_name".to_string()));
        assert!(matches.contains(&"service_port".to_string()));
        assert!(!matches.contains(&"network_mode".to_string()));

        let matches = fuzzy_matches("servce_name", &available, 5);
        assert_eq!(matches[0], "service_name");
    }

    #[test]
    fn test_undefined_suggestions_include_spec_hint() {
        let available: BTreeSet<String> =
            ["known_var".to_string()].into_iter().collect();
        let error = minijinja::Error::from(ErrorKind::UndefinedError);
        let suggestions =
            suggestions_for_error(&error, &["knwon_var".to_string()], &available);

        assert!(suggestions.iter().any(|s| s.contains("knwon_var")));
        assert!(suggestions.iter().any(|s| s.contains("Did you mean")));
        assert!(suggestions.iter().any(|s| s.contains("template.yaml")));
    }

    #[test]
    fn test_syntax_suggestions() {
        let error = minijinja::Error::from(ErrorKind::SyntaxError);
        let suggestions = suggestions_for_error(&error, &[], &BTreeSet::new());
        assert!(suggestions.iter().any(|s| s.contains("endfor")));
    }
}
