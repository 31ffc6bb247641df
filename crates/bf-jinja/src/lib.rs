//! bf-jinja - Jinja templating layer for Boilerflow
//!
//! This crate loads template directories (manifest plus a file tree),
//! discovers which variables templated files reference, resolves a variable
//! collection against a module-level base spec, and renders the tree with
//! structured, actionable error diagnostics.

pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod files;
pub mod introspect;
pub mod metadata;
pub mod render;
pub mod template;

pub use environment::template_environment;
pub use error::{RenderContext, TemplateError, TemplateResult};
pub use files::{FileKind, TemplateFile, TEMPLATE_SUFFIX};
pub use introspect::{EmbeddedDefault, ReferencedVariables};
pub use metadata::{LibraryType, Manifest, TemplateMetadata, TemplateStatus, MANIFEST_NAMES};
pub use render::{render_template, RenderOutput};
pub use template::{Template, ValueLayers};
