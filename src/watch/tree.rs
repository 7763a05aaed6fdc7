// src/watch/tree.rs

//! Enumeration of the directories to watch.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};

use crate::fs::FileSystem;

use super::path_utils::is_hidden_name;

/// `root` and every non-hidden directory below it.
///
/// Hidden directories are pruned with their whole subtree and symlinks are
/// not followed. An unreadable `root` is an error; an unreadable directory
/// further down (e.g. removed mid-walk) is logged and skipped.
pub fn watch_dirs(fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = vec![root.to_path_buf()];
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match fs.read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if dir == root => return Err(err),
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "skipping unreadable directory");
                continue;
            }
        };

        for entry in entries {
            if is_hidden_name(&entry) || fs.is_symlink(&entry) || !fs.is_dir(&entry) {
                continue;
            }
            dirs.push(entry.clone());
            pending.push(entry);
        }
    }

    dirs.sort();
    debug!(root = %root.display(), count = dirs.len(), "collected watch directories");
    Ok(dirs)
}
