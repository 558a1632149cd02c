//! Canonical file paths for the cache directory.
//!
//! All paths are relative to the project root's `data/` directory.

use std::path::{Path, PathBuf};

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`.
///
/// # Panics
///
/// Panics if the project root cannot be resolved.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Failed to find project root from CARGO_MANIFEST_DIR")
        .to_path_buf()
}

/// Returns the `data/cache/` directory.
#[must_use]
pub fn cache_dir() -> PathBuf {
    project_root().join("data").join("cache")
}

/// Returns the path of the single cache slot.
#[must_use]
pub fn default_cache_path() -> PathBuf {
    cache_dir().join("summaries.json")
}

/// Returns the temporary sibling a write goes through before it is renamed
/// over `path`.
#[must_use]
pub fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("cache");
    path.with_file_name(format!(".{name}.tmp.{}", std::process::id()))
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
