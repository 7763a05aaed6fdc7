// src/watch/filter.rs

//! Which notify events count as a source change.

use std::path::Path;

use notify::event::{CreateKind, ModifyKind};
use notify::{Event, EventKind};

use super::path_utils::has_hidden_component;

/// File extension whose changes trigger a run.
pub const TRACKED_EXTENSION: &str = "go";

/// Create, write, remove or rename. Metadata-only and access events are not.
pub fn is_tracked_kind(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any) => true,
        _ => false,
    }
}

/// A non-hidden `.go` file under `root`.
pub fn is_tracked_path(root: &Path, path: &Path) -> bool {
    let is_go = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == TRACKED_EXTENSION);
    is_go && !has_hidden_component(root, path)
}

/// Whether `event` should (re)start the quiet period.
pub fn is_source_change(root: &Path, event: &Event) -> bool {
    is_tracked_kind(&event.kind) && event.paths.iter().any(|p| is_tracked_path(root, p))
}

/// Non-hidden directories created by `event`, for registration.
pub fn created_dirs<'a>(root: &'a Path, event: &'a Event) -> impl Iterator<Item = &'a Path> + 'a {
    let folder_event = match event.kind {
        EventKind::Create(CreateKind::Folder) => Some(true),
        // Some backends do not say what was created.
        EventKind::Create(CreateKind::Any | CreateKind::Other) => Some(false),
        _ => None,
    };

    event
        .paths
        .iter()
        .filter(move |_| folder_event.is_some())
        .filter(move |p| folder_event == Some(true) || p.is_dir())
        .filter(move |p| !has_hidden_component(root, p))
        .map(|p| p.as_path())
}
