// tests/watcher_fs.rs

mod common;
use crate::common::init_tracing;

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use gotest_watch::engine::FileChanged;
use gotest_watch::fs::mock::MockFileSystem;
use gotest_watch::watch::{watch_dirs, FileWatcher};

fn p(s: &str) -> PathBuf {
    PathBuf::from(s)
}

#[test]
fn tree_includes_root_and_prunes_hidden_subtrees() {
    let fs = MockFileSystem::new();
    fs.add_file("/proj/main.go");
    fs.add_file("/proj/pkg/a.go");
    fs.add_file("/proj/pkg/inner/b.go");
    fs.add_file("/proj/.git/objects/x");
    fs.add_file("/proj/pkg/.cache/deep/c.go");
    fs.add_dir("/proj/empty");

    let dirs = watch_dirs(&fs, Path::new("/proj")).unwrap();

    assert_eq!(
        dirs,
        vec![
            p("/proj"),
            p("/proj/empty"),
            p("/proj/pkg"),
            p("/proj/pkg/inner"),
        ]
    );
}

#[test]
fn tree_does_not_follow_symlinks() {
    let fs = MockFileSystem::new();
    fs.add_dir("/proj/pkg");
    fs.add_symlink("/proj/loop");

    let dirs = watch_dirs(&fs, Path::new("/proj")).unwrap();
    assert_eq!(dirs, vec![p("/proj"), p("/proj/pkg")]);
}

#[test]
fn hidden_root_is_still_watched() {
    let fs = MockFileSystem::new();
    fs.add_file("/home/u/.local/proj/pkg/a.go");

    let dirs = watch_dirs(&fs, Path::new("/home/u/.local/proj")).unwrap();
    assert_eq!(
        dirs,
        vec![p("/home/u/.local/proj"), p("/home/u/.local/proj/pkg")]
    );
}

#[test]
fn unreadable_subdirectory_is_skipped() {
    let fs = MockFileSystem::new();
    fs.add_dir("/proj/ok/deeper");
    fs.add_dir("/proj/gone/child");
    fs.make_unreadable("/proj/gone");

    let dirs = watch_dirs(&fs, Path::new("/proj")).unwrap();
    assert_eq!(
        dirs,
        vec![p("/proj"), p("/proj/gone"), p("/proj/ok"), p("/proj/ok/deeper")]
    );
}

#[test]
fn unreadable_root_is_an_error() {
    let fs = MockFileSystem::new();
    assert!(watch_dirs(&fs, Path::new("/missing")).is_err());
}

#[test]
fn watcher_on_missing_root_fails_at_construction() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(FileWatcher::new(&missing).is_err());
}

struct RunningWatcher {
    signals: mpsc::Receiver<FileChanged>,
    start: Option<oneshot::Sender<()>>,
    cancel: CancellationToken,
}

impl RunningWatcher {
    fn spawn(root: &Path) -> Self {
        let watcher = FileWatcher::new(root).unwrap();
        let (start, start_rx) = oneshot::channel();
        let (tx, signals) = mpsc::channel(10);
        let cancel = CancellationToken::new();
        tokio::spawn(watcher.run(start_rx, tx, cancel.clone()));
        Self {
            signals,
            start: Some(start),
            cancel,
        }
    }

    async fn start(&mut self) {
        self.start.take().unwrap().send(()).unwrap();
        // Let the loop discard the backlog and settle.
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    async fn signalled_within(&mut self, within: Duration) -> bool {
        tokio::time::timeout(within, self.signals.recv())
            .await
            .map(|s| s.is_some())
            .unwrap_or(false)
    }
}

impl Drop for RunningWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[tokio::test]
async fn write_to_go_file_signals_once() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("pkg")).unwrap();

    let mut w = RunningWatcher::spawn(dir.path());
    w.start().await;

    std::fs::write(dir.path().join("pkg/a_test.go"), "package pkg\n").unwrap();
    std::fs::write(dir.path().join("pkg/a_test.go"), "package pkg\n\n").unwrap();

    assert!(w.signalled_within(Duration::from_secs(3)).await);
    assert!(!w.signalled_within(Duration::from_millis(600)).await);
}

#[tokio::test]
async fn hidden_and_untracked_files_do_not_signal() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".git")).unwrap();

    let mut w = RunningWatcher::spawn(dir.path());
    w.start().await;

    std::fs::write(dir.path().join(".git/x.go"), "package x\n").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "hi\n").unwrap();

    assert!(!w.signalled_within(Duration::from_millis(800)).await);
}

#[tokio::test]
async fn directories_created_later_are_watched() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();

    let mut w = RunningWatcher::spawn(dir.path());
    w.start().await;

    std::fs::create_dir(dir.path().join("newpkg")).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    std::fs::write(dir.path().join("newpkg/b.go"), "package newpkg\n").unwrap();

    assert!(w.signalled_within(Duration::from_secs(3)).await);
}

#[tokio::test]
async fn nothing_happens_before_start() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();

    let mut w = RunningWatcher::spawn(dir.path());
    std::fs::write(dir.path().join("early.go"), "package early\n").unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(w.signals.try_recv().is_err());

    w.start().await;
    assert!(!w.signalled_within(Duration::from_millis(600)).await);
}

#[tokio::test]
async fn cancelled_before_start_exits() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();

    let mut w = RunningWatcher::spawn(dir.path());
    w.cancel.cancel();

    // The loop returning drops its sender.
    let closed = tokio::time::timeout(Duration::from_secs(2), w.signals.recv()).await;
    assert!(matches!(closed, Ok(None)));
}
