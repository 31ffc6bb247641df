//! Jinja environment setup for Boilerflow

use minijinja::{path_loader, Environment, UndefinedBehavior};
use std::path::Path;

/// Build the evaluation environment for a template directory.
///
/// The environment is sandboxed by construction: no host functions are
/// registered, and templates are only resolvable from inside the template
/// root. Undefined names fail hard so render errors can carry suggestions
/// instead of silently emitting empty strings.
pub fn template_environment(root: &Path) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(path_loader(root));
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(false);
    env
}
