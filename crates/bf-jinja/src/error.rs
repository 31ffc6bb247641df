//! Error types for bf-jinja

use bf_core::CoreError;
use std::fmt;
use thiserror::Error;

/// Location and diagnostic context attached to a render failure.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    /// Template-relative path of the failing file
    pub file_path: String,
    /// 1-indexed line, when the engine reports one
    pub line: Option<usize>,
    /// Column, when the engine reports one
    pub column: Option<usize>,
    /// Source window around the failing line, failing line marked
    pub context_lines: Vec<String>,
    /// Heuristic fix suggestions keyed off the error category
    pub suggestions: Vec<String>,
}

impl fmt::Display for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File: {}", self.file_path)?;
        if let Some(line) = self.line {
            write!(f, ", Line: {line}")?;
            if let Some(column) = self.column {
                write!(f, ", Column: {column}")?;
            }
        }
        Ok(())
    }
}

/// Template loading and rendering errors
#[derive(Error, Debug)]
pub enum TemplateError {
    /// T001: Template directory failed to load
    #[error("[T001] Error loading template from {path}: {message}")]
    Load { path: String, message: String },

    /// T002: Manifest is missing or structurally invalid
    #[error("[T002] Template manifest error: {message}")]
    Manifest { message: String },

    /// T003: Syntax errors across templated files, batched
    #[error("[T003] Template syntax errors in '{template_id}':\n{}", .errors.join("\n"))]
    Syntax {
        template_id: String,
        errors: Vec<String>,
    },

    /// T004: Template content references variables absent from the spec
    #[error("[T004] {message}")]
    UndefinedVariables {
        message: String,
        variables: Vec<String>,
    },

    /// T005: Engine failure while rendering one file
    #[error("[T005] {message}\n{context}")]
    Render {
        message: String,
        context: RenderContext,
    },

    /// T006: YAML parse error in a manifest
    #[error("[T006] Failed to parse YAML in {path}: {message}")]
    Yaml { path: String, message: String },

    /// T007: IO error
    #[error("[T007] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error bubbled up from the variable model
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for TemplateError
pub type TemplateResult<T> = Result<T, TemplateError>;
