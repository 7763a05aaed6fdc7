#![allow(dead_code)]

pub use gotest_watch_test_utils::{init_tracing, with_timeout};

use std::path::{Path, PathBuf};

use notify::event::{CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};

/// Root used by synthetic watcher events.
pub fn root() -> PathBuf {
    PathBuf::from("/proj")
}

fn event(kind: EventKind, path: impl AsRef<Path>) -> notify::Result<Event> {
    Ok(Event::new(kind).add_path(root().join(path)))
}

pub fn write_event(path: impl AsRef<Path>) -> notify::Result<Event> {
    event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), path)
}

pub fn create_event(path: impl AsRef<Path>) -> notify::Result<Event> {
    event(EventKind::Create(CreateKind::File), path)
}

pub fn create_dir_event(path: impl AsRef<Path>) -> notify::Result<Event> {
    event(EventKind::Create(CreateKind::Folder), path)
}

pub fn remove_event(path: impl AsRef<Path>) -> notify::Result<Event> {
    event(EventKind::Remove(RemoveKind::File), path)
}

pub fn rename_event(path: impl AsRef<Path>) -> notify::Result<Event> {
    event(EventKind::Modify(ModifyKind::Name(RenameMode::Any)), path)
}

pub fn chmod_event(path: impl AsRef<Path>) -> notify::Result<Event> {
    event(
        EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
        path,
    )
}

/// Whether a `go` toolchain is on PATH.
pub fn go_available() -> bool {
    std::process::Command::new("go")
        .arg("version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
