//! Recreate files from a README.
//!
//! A README lists files as a `## ./path/to/file` heading followed by a
//! fenced code block holding the file's content. [`parse_readme`] extracts
//! those pairs; [`write_files`] materializes them under an output root.

use crate::error::{Result, ToolbuilderError};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

const HEADING_PREFIX: &str = "## ";
const FENCE: &str = "```";

/// A file extracted from a README.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldFile {
    /// Path as written in the heading, e.g. `./src/main.rs`.
    pub path: String,
    pub content: String,
}

/// Path named by a file heading: `## `, any one character, then `/`.
///
/// `## ./src/main.rs` and `## x/notes.txt` qualify; `## Usage` does not.
fn file_heading(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(HEADING_PREFIX)?;
    (rest.chars().nth(1) == Some('/')).then(|| rest.trim())
}

/// Extract every headed code block from `readme`.
///
/// A heading seen while a block is still open emits the partial body.
/// Blocks without a preceding heading are ignored.
pub fn parse_readme(readme: &str) -> Vec<ScaffoldFile> {
    let mut files = Vec::new();
    let mut in_code_block = false;
    let mut path = String::new();
    let mut content = String::new();

    for line in readme.lines() {
        if let Some(heading) = file_heading(line) {
            if in_code_block && !path.is_empty() {
                files.push(ScaffoldFile {
                    path: path.clone(),
                    content: std::mem::take(&mut content),
                });
            }
            path = heading.to_string();
            in_code_block = false;
        } else if line.contains(FENCE) {
            in_code_block = !in_code_block;
            if !in_code_block && !path.is_empty() {
                files.push(ScaffoldFile {
                    path: std::mem::take(&mut path),
                    content: std::mem::take(&mut content),
                });
            }
        } else if in_code_block {
            content.push_str(line);
            content.push('\n');
        }
    }

    files
}

/// Resolve `relative` under `root`, rejecting absolute paths and `..`.
fn resolve(root: &Path, relative: &str) -> Result<PathBuf> {
    let rel = Path::new(relative);
    let escapes = rel
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if escapes {
        return Err(ToolbuilderError::InvalidScaffoldPath(rel.to_path_buf()));
    }
    Ok(root.join(rel))
}

/// Write `files` under `root`, creating parent directories as needed.
///
/// Returns the written paths in order. Stops at the first failure.
pub fn write_files(root: &Path, files: &[ScaffoldFile]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());

    for file in files {
        let target = resolve(root, &file.path).inspect_err(|_| {
            warn!(path = %file.path, "scaffold path escapes output root");
        })?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| ToolbuilderError::io(parent, e))?;
        }
        fs::write(&target, &file.content).map_err(|e| ToolbuilderError::io(&target, e))?;

        info!(path = %target.display(), bytes = file.content.len(), "scaffolded file");
        written.push(target);
    }

    Ok(written)
}

/// Parse the README at `input` and write its files under `output`.
pub fn scaffold(input: &Path, output: &Path) -> Result<Vec<PathBuf>> {
    let readme = fs::read_to_string(input).map_err(|e| ToolbuilderError::io(input, e))?;
    write_files(output, &parse_readme(&readme))
}
