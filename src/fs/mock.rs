// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File,
    Dir(Vec<String>), // child names
    Symlink,
}

/// In-memory directory tree.
///
/// Parents are created implicitly, so `add_file("/r/a/b.go")` also creates
/// `/r` and `/r/a`.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<BTreeMap<PathBuf, MockEntry>>>,
    unreadable: Arc<Mutex<HashSet<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::File);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut entries = self.lock();
        ensure_dir(&mut entries, path);
    }

    /// A symlink entry (never followed by the mock).
    pub fn add_symlink(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Symlink);
    }

    /// Make `read_dir` fail for `path`, as for a directory removed mid-walk.
    pub fn make_unreadable(&self, path: impl AsRef<Path>) {
        self.unreadable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.as_ref().to_path_buf());
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut entries = self.lock();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(&mut entries, parent);
            link_child(&mut entries, parent, path);
        }
        entries.insert(path.to_path_buf(), entry);
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, MockEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn ensure_dir(entries: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
    if entries.contains_key(path) {
        return;
    }
    entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty() && *p != path) {
        ensure_dir(entries, parent);
        link_child(entries, parent, path);
    }
}

fn link_child(entries: &mut BTreeMap<PathBuf, MockEntry>, parent: &Path, child: &Path) {
    let Some(name) = child.file_name().and_then(|n| n.to_str()) else {
        return;
    };
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        if !children.iter().any(|c| c == name) {
            children.push(name.to_string());
        }
    }
}

impl FileSystem for MockFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::Dir(_)))
    }

    fn is_symlink(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::Symlink))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        // Paths in mock trees are already absolute.
        Ok(path.to_path_buf())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let unreadable = self
            .unreadable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path);
        if unreadable {
            return Err(anyhow!("Permission denied: {:?}", path));
        }

        match self.lock().get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
