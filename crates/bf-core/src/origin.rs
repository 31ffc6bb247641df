//! Provenance tags for variable values

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which precedence layer last set a variable's value.
///
/// Layers are listed lowest to highest precedence; the tag records the last
/// writer, not the full chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Module-level base spec
    #[default]
    Module,
    /// Template-level spec override
    Template,
    /// Persisted user configuration
    Config,
    /// Variable file passed by the caller
    VarFile,
    /// Command-line override
    Cli,
}

impl Origin {
    /// Stable lowercase label used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Module => "module",
            Origin::Template => "template",
            Origin::Config => "config",
            Origin::VarFile => "var-file",
            Origin::Cli => "cli",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
