// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::Path;

use crate::artifact::slash_path;

/// Convert a path into a string relative to `base`, with forward slashes.
///
/// - First we try a direct `strip_prefix(base)`.
/// - If that fails (e.g. symlinked prefixes such as macOS `/private/var`),
///   we canonicalize both and try again. For removed files the path itself
///   no longer exists, so its parent is canonicalized instead.
///
/// Returns `None` if the path is not under `base`.
pub fn relative_str(base: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(base) {
        return Some(slash_path(rel));
    }

    let base_canon = base.canonicalize().ok()?;
    let path_canon = match path.canonicalize() {
        Ok(p) => p,
        Err(_) => {
            let parent = path.parent()?.canonicalize().ok()?;
            parent.join(path.file_name()?)
        }
    };

    path_canon
        .strip_prefix(&base_canon)
        .ok()
        .map(slash_path)
}
