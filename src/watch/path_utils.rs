// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::{Path, PathBuf};

/// `path` relative to `root`.
///
/// A direct `strip_prefix(root)` is tried first. If that fails (symlinks,
/// `/private/var` vs `/var` on macOS, ...) both paths are canonicalized and
/// the strip is retried. Returns `None` if `path` is not under `root`.
///
/// Removed files cannot be canonicalized, so for those only the direct strip
/// (or the parent's canonical form) can succeed.
pub fn relative_path(root: &Path, path: &Path) -> Option<PathBuf> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_path_buf());
    }

    let root_canon = root.canonicalize().ok()?;
    if let Ok(path_canon) = path.canonicalize() {
        return path_canon.strip_prefix(&root_canon).ok().map(Path::to_path_buf);
    }

    let parent = path.parent()?.canonicalize().ok()?;
    let rel_parent = parent.strip_prefix(&root_canon).ok()?;
    Some(rel_parent.join(path.file_name()?))
}

/// Name starts with `.` (`.git`, `.idea`, `.hidden.go`).
pub fn is_hidden_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// Any component of `path` below `root` is hidden.
///
/// Components of `root` itself are not considered, so a project checked out
/// under e.g. `~/.local/src` is still watched.
pub fn has_hidden_component(root: &Path, path: &Path) -> bool {
    let rel = relative_path(root, path);
    let rel = match &rel {
        Some(rel) => rel.as_path(),
        None => return is_hidden_name(path),
    };

    rel.components().any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|s| s.starts_with('.') && s != "." && s != "..")
    })
}
