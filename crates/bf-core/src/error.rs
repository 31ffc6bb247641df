//! Error types for bf-core

use thiserror::Error;

/// Core error type for Boilerflow
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Malformed spec structure
    #[error("[E001] Invalid spec: {message}")]
    SpecStructure { message: String },

    /// E002: Variable names must be unique across all sections
    #[error("[E002] Duplicate variable names across sections:\n{details}")]
    DuplicateVariables { details: String },

    /// E003: Section toggle must reference a bool variable
    #[error("[E003] Section '{section}' toggle variable '{toggle}' must be type 'bool', but is type '{var_type}'")]
    ToggleNotBool {
        section: String,
        toggle: String,
        var_type: String,
    },

    /// E004: Circular section dependency
    #[error("[E004] Circular section dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// E005: Value does not convert to the declared type
    #[error("[E005] Cannot convert '{value}' to {expected}")]
    Conversion { value: String, expected: String },

    /// E006: Batch of validation failures surfaced before rendering
    #[error("[E006] Variable validation failed: {}", .errors.join(", "))]
    Validation { errors: Vec<String> },

    /// E007: Batch of invalid override values
    #[error("[E007] Invalid variable overrides: {}", .errors.join("; "))]
    Overrides { errors: Vec<String> },

    /// E008: IO error
    #[error("[E008] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E009: YAML parse error
    #[error("[E009] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
