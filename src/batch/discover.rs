//! CodeMeta file discovery inside a single directory.
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Whether a file name looks like a CodeMeta document (`*codemeta*.json`).
pub fn is_codemeta_file_name(name: &str) -> bool {
    name.ends_with(".json") && name.contains("codemeta")
}

/// List CodeMeta files directly inside `dir`, sorted by path.
///
/// An unreadable directory is a batch-setup error.
pub fn find_codemeta_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.with_context(|| format!("read entry in {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(is_codemeta_file_name);
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Project key for a file: its name without `codemeta_` and `.json`.
pub fn project_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    name.replace("codemeta_", "").replace(".json", "")
}
