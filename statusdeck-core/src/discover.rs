//! Update fragment discovery
//!
//! Finds `updates-*.html` files in the configured updates directory. Only
//! the top level is scanned. Paths are sorted so the input order (and
//! therefore tie-breaking downstream) is deterministic.

use anyhow::{Context, Result};
use globset::Glob;
use std::path::{Path, PathBuf};

/// Filename pattern update fragments must match.
pub const UPDATE_FILE_GLOB: &str = "updates-*.html";

/// Collect matching fragment files from the updates directory, sorted
/// lexicographically. Zero matches is not an error; an unreadable directory
/// is.
pub fn collect_update_files(updates_dir: &Path) -> Result<Vec<PathBuf>> {
    let matcher = Glob::new(UPDATE_FILE_GLOB)
        .context("Failed to compile update file pattern")?
        .compile_matcher();

    let mut files = Vec::new();
    let entries = std::fs::read_dir(updates_dir)
        .with_context(|| format!("Failed to read updates directory: {}", updates_dir.display()))?;
    for entry_result in entries {
        let entry = entry_result
            .with_context(|| format!("Failed to read entry in {}", updates_dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if matcher.is_match(name) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
