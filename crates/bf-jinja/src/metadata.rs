//! Template manifest parsing and metadata

use crate::error::{TemplateError, TemplateResult};
use serde::Deserialize;

/// Accepted manifest file names, probed in order
pub const MANIFEST_NAMES: [&str; 2] = ["template.yaml", "template.yml"];

/// Where a template library came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LibraryType {
    #[default]
    Git,
    Static,
}

impl LibraryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryType::Git => "git",
            LibraryType::Static => "static",
        }
    }
}

/// Publication status derived from the manifest draft flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateStatus {
    Published,
    Draft,
}

/// Parsed `metadata` block of a template manifest
#[derive(Debug, Clone)]
pub struct TemplateMetadata {
    pub name: String,
    pub description: String,
    pub author: String,
    pub date: String,
    pub version: String,
    pub module: String,
    pub tags: Vec<String>,
    pub library: String,
    pub library_type: LibraryType,
    pub next_steps: String,
    pub draft: bool,
}

/// Raw manifest shape as deserialized, before validation
#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    metadata: Option<RawMetadata>,
    #[serde(default)]
    spec: serde_yaml::Value,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    date: Option<serde_yaml::Value>,
    #[serde(default)]
    version: Option<serde_yaml::Value>,
    #[serde(default)]
    module: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    next_steps: Option<String>,
    #[serde(default)]
    draft: bool,
}

/// A validated template manifest: kind, metadata, and the optional variable
/// spec block.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub kind: String,
    pub metadata: TemplateMetadata,
    /// The `spec` block, kept as a generic mapping for the variable model
    pub spec: serde_yaml::Value,
}

impl Manifest {
    /// Parse manifest text.
    ///
    /// Manifests sometimes carry stray document separators; all YAML
    /// documents are read and the first non-empty one wins, with a warning
    /// when several are present.
    pub fn parse(
        text: &str,
        source: &str,
        library: Option<&str>,
        library_type: LibraryType,
    ) -> TemplateResult<Manifest> {
        let mut documents: Vec<RawManifest> = Vec::new();
        for document in serde_yaml::Deserializer::from_str(text) {
            let value = serde_yaml::Value::deserialize(document).map_err(|e| {
                TemplateError::Yaml {
                    path: source.to_string(),
                    message: e.to_string(),
                }
            })?;
            if value.is_null() {
                continue;
            }
            if !value.is_mapping() {
                return Err(TemplateError::Manifest {
                    message: "manifest must be a YAML mapping".to_string(),
                });
            }
            let raw: RawManifest =
                serde_yaml::from_value(value).map_err(|e| TemplateError::Yaml {
                    path: source.to_string(),
                    message: e.to_string(),
                })?;
            documents.push(raw);
        }

        if documents.is_empty() {
            return Err(TemplateError::Manifest {
                message: "manifest contains no valid YAML data".to_string(),
            });
        }
        if documents.len() > 1 {
            log::warn!("Manifest {source} contains multiple YAML documents, using the first one");
        }
        let raw = documents.remove(0);

        let kind = match raw.kind {
            Some(kind) if !kind.is_empty() => kind,
            _ => {
                return Err(TemplateError::Manifest {
                    message: "missing required 'kind' field".to_string(),
                })
            }
        };

        let metadata = build_metadata(raw.metadata, library, library_type)?;

        Ok(Manifest {
            kind,
            metadata,
            spec: raw.spec,
        })
    }
}

fn build_metadata(
    raw: Option<RawMetadata>,
    library: Option<&str>,
    library_type: LibraryType,
) -> TemplateResult<TemplateMetadata> {
    let Some(raw) = raw else {
        return Err(TemplateError::Manifest {
            message: "missing 'metadata' section".to_string(),
        });
    };

    // Dates and versions are opaque display strings; tolerate bare YAML
    // scalars like `2024-01-01` or `1.0`
    let date = raw.date.as_ref().map(scalar_to_string).unwrap_or_default();
    let version = raw.version.as_ref().map(scalar_to_string).unwrap_or_default();

    let mut missing = Vec::new();
    let name = raw.name.unwrap_or_default();
    let description = raw.description.unwrap_or_default();
    let author = raw.author.unwrap_or_default();
    for (field, value) in [
        ("name", &name),
        ("author", &author),
        ("version", &version),
        ("date", &date),
        ("description", &description),
    ] {
        if value.is_empty() {
            missing.push(field);
        }
    }
    if !missing.is_empty() {
        return Err(TemplateError::Manifest {
            message: format!("missing required metadata fields: {}", missing.join(", ")),
        });
    }

    // Block scalars keep a trailing newline; drop it but preserve internal
    // formatting
    let description = description.trim_end_matches('\n').to_string();
    let description = if description.is_empty() {
        "No description available".to_string()
    } else {
        description
    };
    let next_steps = raw
        .next_steps
        .unwrap_or_default()
        .trim_end_matches('\n')
        .to_string();

    Ok(TemplateMetadata {
        name,
        description,
        author,
        date,
        version,
        module: raw.module.unwrap_or_default(),
        tags: raw.tags.unwrap_or_default(),
        library: library.unwrap_or("unknown").to_string(),
        library_type,
        next_steps,
        draft: raw.draft,
    })
}

fn scalar_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
#[path = "metadata_test.rs"]
mod tests;
