//! Template file discovery and classification

use crate::error::TemplateResult;
use crate::metadata::MANIFEST_NAMES;
use std::path::{Path, PathBuf};

/// Suffix marking a file as templated
pub const TEMPLATE_SUFFIX: &str = ".j2";

/// How a file in a template directory is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Rendered through the template engine; output drops the suffix
    Templated,
    /// Copied byte-for-byte
    Static,
}

/// A single file within a template directory
#[derive(Debug, Clone)]
pub struct TemplateFile {
    /// Path relative to the template root
    pub relative_path: PathBuf,
    pub kind: FileKind,
    /// Path the file will have in the output tree
    pub output_path: PathBuf,
}

/// Collect every file under the template root except the manifest,
/// classified as templated or static. Entries are sorted by path so output
/// is deterministic.
pub fn collect_template_files(root: &Path) -> TemplateResult<Vec<TemplateFile>> {
    let mut files = Vec::new();
    collect_recursive(root, root, &mut files)?;
    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(files)
}

fn collect_recursive(root: &Path, dir: &Path, files: &mut Vec<TemplateFile>) -> TemplateResult<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            collect_recursive(root, &path, files)?;
            continue;
        }

        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        if MANIFEST_NAMES.iter().any(|m| *m == name) {
            continue;
        }

        let relative_path = path
            .strip_prefix(root)
            .expect("walked paths live under the root")
            .to_path_buf();

        let (kind, output_path) = match name.strip_suffix(TEMPLATE_SUFFIX) {
            Some(stem) if !stem.is_empty() => (
                FileKind::Templated,
                relative_path.with_file_name(stem),
            ),
            _ => (FileKind::Static, relative_path.clone()),
        };

        files.push(TemplateFile {
            relative_path,
            kind,
            output_path,
        });
    }
    Ok(())
}

/// Loader-facing name for a template file (forward slashes on every
/// platform).
pub fn loader_name(file: &TemplateFile) -> String {
    file.relative_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
