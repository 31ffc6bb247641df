//! Dependency-condition grammar
//!
//! ```text
//! need        ::= condition (";" condition)*
//! condition   ::= subject ("=" | "!=") value_list | subject
//! value_list  ::= value ("," value)*
//! ```
//!
//! A condition without an operator is the legacy form: the subject names a
//! section that must be enabled. With an operator the subject names a
//! variable whose converted value must (or must not) equal one of the listed
//! values.

use crate::error::{CoreError, CoreResult};
use crate::value::yaml_kind;
use std::fmt;

/// A single parsed dependency condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Need {
    /// Variable name, or section key in the legacy form
    pub subject: String,
    /// True for `=`, false for `!=`; always true in the legacy form
    pub positive: bool,
    /// Expected literal value(s); `None` marks the legacy section form
    pub expected: Option<Vec<String>>,
}

impl Need {
    /// Parse one condition. Never fails: anything without an operator is the
    /// legacy section form.
    pub fn parse(raw: &str) -> Need {
        // != must be checked before = to avoid splitting on its '=' half
        if let Some((subject, values)) = raw.split_once("!=") {
            return Need {
                subject: subject.trim().to_string(),
                positive: false,
                expected: Some(split_values(values)),
            };
        }
        if let Some((subject, values)) = raw.split_once('=') {
            return Need {
                subject: subject.trim().to_string(),
                positive: true,
                expected: Some(split_values(values)),
            };
        }
        Need {
            subject: raw.trim().to_string(),
            positive: true,
            expected: None,
        }
    }

    /// Parse a spec `needs` entry: a `;`-joined string or a list of strings.
    pub fn parse_entry(raw: &serde_yaml::Value) -> CoreResult<Vec<Need>> {
        match raw {
            serde_yaml::Value::Null => Ok(Vec::new()),
            serde_yaml::Value::String(s) => Ok(s
                .split(';')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(Need::parse)
                .collect()),
            serde_yaml::Value::Sequence(items) => {
                let mut needs = Vec::new();
                for item in items {
                    match item {
                        serde_yaml::Value::String(s) if !s.trim().is_empty() => {
                            needs.push(Need::parse(s.trim()));
                        }
                        serde_yaml::Value::String(_) => {}
                        other => {
                            return Err(CoreError::SpecStructure {
                                message: format!(
                                    "'needs' list entries must be strings, got {}",
                                    yaml_kind(other)
                                ),
                            })
                        }
                    }
                }
                Ok(needs)
            }
            other => Err(CoreError::SpecStructure {
                message: format!(
                    "'needs' must be a string or list of strings, got {}",
                    yaml_kind(other)
                ),
            }),
        }
    }

    /// True for the legacy "section must be enabled" form
    pub fn is_legacy(&self) -> bool {
        self.expected.is_none()
    }
}

fn split_values(raw: &str) -> Vec<String> {
    raw.split(',').map(|v| v.trim().to_string()).collect()
}

impl fmt::Display for Need {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expected {
            None => f.write_str(&self.subject),
            Some(values) => write!(
                f,
                "{}{}{}",
                self.subject,
                if self.positive { "=" } else { "!=" },
                values.join(",")
            ),
        }
    }
}

#[cfg(test)]
#[path = "needs_test.rs"]
mod tests;
