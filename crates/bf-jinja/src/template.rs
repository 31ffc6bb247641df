//! Template directories: loading, introspection, and variable resolution

use crate::error::{TemplateError, TemplateResult};
use crate::files::{collect_template_files, loader_name, FileKind, TemplateFile};
use crate::introspect::{embedded_defaults, referenced_variables, EmbeddedDefault, ReferencedVariables};
use crate::metadata::{LibraryType, Manifest, TemplateMetadata, TemplateStatus, MANIFEST_NAMES};
use crate::render::{render_template, RenderOutput};
use bf_core::{Origin, Value, VariableCollection};
use minijinja::Environment;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Runtime value override layers, applied lowest to highest precedence.
#[derive(Debug, Clone, Default)]
pub struct ValueLayers {
    pub config: Vec<(String, Value)>,
    pub var_file: Vec<(String, Value)>,
    pub cli: Vec<(String, Value)>,
}

/// A loaded template directory: manifest metadata, classified files, and
/// the spec block feeding the variable model.
#[derive(Debug)]
pub struct Template {
    /// Directory name, used as the template id
    pub id: String,
    pub template_dir: PathBuf,
    pub kind: String,
    pub metadata: TemplateMetadata,
    spec: serde_yaml::Value,
    files: Vec<TemplateFile>,
}

impl Template {
    /// Load a template from a directory containing a manifest.
    pub fn load(
        template_dir: &Path,
        library: Option<&str>,
        library_type: LibraryType,
    ) -> TemplateResult<Template> {
        log::debug!("Loading template from directory: {}", template_dir.display());

        let manifest_path = MANIFEST_NAMES
            .iter()
            .map(|name| template_dir.join(name))
            .find(|path| path.exists())
            .ok_or_else(|| TemplateError::Load {
                path: template_dir.display().to_string(),
                message: "manifest (template.yaml or template.yml) not found".to_string(),
            })?;

        let text = std::fs::read_to_string(&manifest_path)?;
        let manifest = Manifest::parse(
            &text,
            &manifest_path.display().to_string(),
            library,
            library_type,
        )?;

        let files = collect_template_files(template_dir)?;

        let id = template_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| template_dir.display().to_string());

        log::info!("Loaded template '{id}' (v{})", manifest.metadata.version);

        Ok(Template {
            id,
            template_dir: template_dir.to_path_buf(),
            kind: manifest.kind,
            metadata: manifest.metadata,
            spec: manifest.spec,
            files,
        })
    }

    pub fn status(&self) -> TemplateStatus {
        if self.metadata.draft {
            TemplateStatus::Draft
        } else {
            TemplateStatus::Published
        }
    }

    /// All non-manifest files, classified templated or static.
    pub fn files(&self) -> &[TemplateFile] {
        &self.files
    }

    /// The raw `spec` block from the manifest.
    pub fn spec(&self) -> &serde_yaml::Value {
        &self.spec
    }

    /// A fresh evaluation environment rooted at this template's directory.
    pub fn environment(&self) -> Environment<'static> {
        crate::environment::template_environment(&self.template_dir)
    }

    /// Variables referenced across all templated files, with the files that
    /// reference each one.
    pub fn referenced_variables(&self) -> TemplateResult<ReferencedVariables> {
        let env = self.environment();
        referenced_variables(&env, &self.id, &self.files)
    }

    /// Literal defaults embedded in template content via the `default`
    /// filter, resolved against `declared` spec defaults.
    pub fn embedded_defaults(
        &self,
        declared: &HashMap<String, Value>,
    ) -> TemplateResult<BTreeMap<String, EmbeddedDefault>> {
        let mut sources = Vec::new();
        for file in &self.files {
            if file.kind != FileKind::Templated {
                continue;
            }
            let content = std::fs::read_to_string(self.template_dir.join(&file.relative_path))?;
            sources.push((loader_name(file), content));
        }
        Ok(embedded_defaults(&sources, declared))
    }

    /// Build the resolved variable collection for this template.
    ///
    /// The template spec is merged onto the optional module-level base (one
    /// merge, template wins), every referenced variable is checked against
    /// the merged spec, unused spec entries are reported, and the result is
    /// filtered down to the variables the template actually uses or
    /// declares. Embedded template defaults fill values nothing else set.
    pub fn resolve_collection(
        &self,
        base: Option<&VariableCollection>,
    ) -> TemplateResult<VariableCollection> {
        let template_collection = VariableCollection::from_spec_value(&self.spec, Origin::Template)?;
        let declared = template_collection.all_variable_names();

        let merged = match base {
            Some(base) => base.merge(&template_collection, Origin::Template)?,
            None => template_collection,
        };

        let referenced = self.referenced_variables()?;
        self.warn_about_unused_variables(&declared, &referenced.names);
        self.validate_variable_definitions(&referenced, &merged)?;

        let mut keep: HashSet<String> = referenced.names.clone();
        keep.extend(declared);
        let mut resolved = merged.filter_to_used(&keep, false);

        self.apply_embedded_defaults(&mut resolved)?;
        Ok(resolved)
    }

    /// Resolve, layer runtime overrides, validate and render in the
    /// canonical order.
    pub fn generate(
        &self,
        base: Option<&VariableCollection>,
        layers: &ValueLayers,
    ) -> TemplateResult<RenderOutput> {
        let mut collection = self.resolve_collection(base)?;
        collection.apply_defaults(&layers.config, Origin::Config)?;
        collection.apply_defaults(&layers.var_file, Origin::VarFile)?;
        collection.apply_defaults(&layers.cli, Origin::Cli)?;
        collection.reset_disabled_bool_variables();
        collection.sort_sections();
        collection.validate_all()?;
        render_template(self, &collection)
    }

    fn warn_about_unused_variables(&self, declared: &HashSet<String>, used: &HashSet<String>) {
        let mut unused: Vec<&String> = declared.difference(used).collect();
        if unused.is_empty() {
            return;
        }
        unused.sort();
        const MAX_SHOWN: usize = 10;
        let shown: Vec<&str> = unused.iter().take(MAX_SHOWN).map(|s| s.as_str()).collect();
        let ellipsis = if unused.len() > MAX_SHOWN { ", ..." } else { "" };
        log::warn!(
            "Template '{}' defines {} variable(s) not used in template files. Consider removing them from the spec: {}{ellipsis}",
            self.id,
            unused.len(),
            shown.join(", ")
        );
    }

    /// Every variable referenced in template content must exist in the
    /// merged spec; fail fast with the referencing files and a spec snippet
    /// to paste.
    fn validate_variable_definitions(
        &self,
        referenced: &ReferencedVariables,
        merged: &VariableCollection,
    ) -> TemplateResult<()> {
        let defined = merged.all_variable_names();
        let mut undefined: Vec<&String> = referenced
            .names
            .iter()
            .filter(|name| !defined.contains(*name))
            .collect();
        if undefined.is_empty() {
            return Ok(());
        }
        undefined.sort();

        let mut message = format!(
            "Template validation error in '{}': variables used in template content but not defined in spec:\n",
            self.id
        );
        for name in &undefined {
            match referenced.usage.get(*name) {
                Some(files) => {
                    message.push_str(&format!("  - {}: {}\n", name, files.join(", ")));
                }
                None => {
                    message.push_str(&format!("  - {name}\n"));
                }
            }
        }
        message.push_str(
            "\nAdd these variables to the template.yaml spec. Each variable needs a default value.\n\nExample:\nspec:\n  general:\n    vars:\n",
        );
        for name in &undefined {
            message.push_str(&format!(
                "      {name}:\n        type: str\n        description: Description for {name}\n        default: <your_default_value_here>\n"
            ));
        }

        log::debug!("{message}");
        Err(TemplateError::UndefinedVariables {
            message,
            variables: undefined.into_iter().cloned().collect(),
        })
    }

    /// Fill values from template-embedded defaults, the lowest-precedence
    /// source: only variables no other layer gave a value receive one.
    fn apply_embedded_defaults(&self, collection: &mut VariableCollection) -> TemplateResult<()> {
        let declared: HashMap<String, Value> = collection
            .sections()
            .iter()
            .flat_map(|section| section.variables.iter())
            .filter_map(|variable| {
                variable
                    .default
                    .clone()
                    .map(|default| (variable.name.clone(), default))
            })
            .collect();

        let harvested = self.embedded_defaults(&declared)?;
        for (name, default) in harvested {
            let EmbeddedDefault::Scalar(value) = default else {
                continue;
            };
            if let Some(variable) = collection.variable_mut(&name) {
                if variable.value.is_none() {
                    log::debug!("Using template-embedded default for '{name}': {value}");
                    variable.value = Some(value);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "template_test.rs"]
mod tests;
