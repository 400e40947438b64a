//! Directory tree rendering for the file-retrieval prompt.

use crate::error::{Result, ToolbuilderError};
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Tree used when no repository directory is given.
pub const PLACEHOLDER_TREE: &str = "...";

fn is_skipped(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && name == "target")
}

/// Render `root` as an indented listing, two spaces per level.
///
/// Directories end with `/`. Entries are sorted by name; hidden entries and
/// `target/` directories are skipped.
pub fn render_tree(root: &Path) -> Result<String> {
    if !root.is_dir() {
        return Err(ToolbuilderError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let mut lines = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped(e));

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            ToolbuilderError::io(path, e.into())
        })?;
        let prefix = "  ".repeat(entry.depth() - 1);
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() {
            lines.push(format!("{}{}/", prefix, name));
        } else {
            lines.push(format!("{}{}", prefix, name));
        }
    }

    Ok(lines.join("\n"))
}
