// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::FileChanged;
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::filter::{created_dirs, is_source_change};
use crate::watch::tree::watch_dirs;

/// Quiet period after the last source change before a run is requested.
pub const DEBOUNCE_QUIET: Duration = Duration::from_millis(200);

/// Raw notify events, forwarded from notify's callback thread.
pub type NotifyEvents = mpsc::UnboundedReceiver<notify::Result<Event>>;

/// Debounced watcher over a directory tree.
///
/// The OS watcher is created and every directory registered in [`new`], so
/// setup failures surface at startup. Events are only acted upon once
/// [`run`] has received its start signal.
///
/// [`new`]: FileWatcher::new
/// [`run`]: FileWatcher::run
pub struct FileWatcher {
    root: PathBuf,
    watcher: RecommendedWatcher,
    events: NotifyEvents,
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl FileWatcher {
    /// Watch `root` and every non-hidden directory below it.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_fs(root, &RealFileSystem)
    }

    pub fn with_fs(root: impl Into<PathBuf>, fs: &dyn FileSystem) -> Result<Self> {
        let root = root.into();
        // Canonicalize once so event paths share a stable prefix.
        let root = fs.canonicalize(&root).unwrap_or(root);

        let (event_tx, events) = mpsc::unbounded_channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                // Only fails once the watch loop is gone.
                let _ = event_tx.send(res);
            },
            Config::default(),
        )
        .context("creating file watcher")?;

        let dirs = watch_dirs(fs, &root)?;
        watcher
            .watch(&root, RecursiveMode::NonRecursive)
            .with_context(|| format!("watching {}", root.display()))?;
        for dir in dirs.iter().filter(|d| **d != root) {
            register(&mut watcher, dir);
        }

        info!(root = %root.display(), dirs = dirs.len(), "file watcher started");

        Ok(Self {
            root,
            watcher,
            events,
        })
    }

    /// Wait for `start`, then emit one [`FileChanged`] per burst of source
    /// changes until `cancel` fires.
    ///
    /// Events that arrived before the start signal are discarded. A dropped
    /// start sender is treated like cancellation.
    pub async fn run(
        self,
        start: oneshot::Receiver<()>,
        tx: mpsc::Sender<FileChanged>,
        cancel: CancellationToken,
    ) {
        let Self {
            root,
            mut watcher,
            mut events,
        } = self;

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("watcher cancelled before start");
                return;
            }
            res = start => {
                if res.is_err() {
                    debug!("start signal dropped; watcher exiting");
                    return;
                }
            }
        }

        let mut discarded = 0usize;
        while events.try_recv().is_ok() {
            discarded += 1;
        }
        debug!(discarded, "watch loop started");

        let fs = RealFileSystem;
        watch_loop(&root, &mut events, &tx, &cancel, DEBOUNCE_QUIET, |dir| {
            match watch_dirs(&fs, dir) {
                Ok(dirs) => {
                    for dir in &dirs {
                        register(&mut watcher, dir);
                    }
                }
                Err(err) => debug!(dir = %dir.display(), error = %err, "new directory vanished"),
            }
        })
        .await;

        // Dropping the watcher releases every OS watch.
        drop(watcher);
        debug!("watcher stopped");
    }
}

fn register(watcher: &mut RecommendedWatcher, dir: &Path) {
    match watcher.watch(dir, RecursiveMode::NonRecursive) {
        Ok(()) => debug!(dir = %dir.display(), "watching directory"),
        Err(err) => warn!(dir = %dir.display(), error = %err, "failed to watch directory"),
    }
}

/// Debounce loop over raw notify events.
///
/// Each source change pushes the deadline to `now + quiet`; when the deadline
/// passes, one [`FileChanged`] is sent. Newly created directories are handed
/// to `on_new_dir`. Returns on cancellation, when `events` closes, or when the
/// receiver of `tx` is gone. Nothing is sent after cancellation is observed.
pub async fn watch_loop<F>(
    root: &Path,
    events: &mut NotifyEvents,
    tx: &mpsc::Sender<FileChanged>,
    cancel: &CancellationToken,
    quiet: Duration,
    mut on_new_dir: F,
) where
    F: FnMut(&Path),
{
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("watch loop cancelled");
                return;
            }

            _ = wait_for_deadline(deadline) => {
                deadline = None;
                debug!("quiet period elapsed; reporting file change");
                let sent = tokio::select! {
                    _ = cancel.cancelled() => return,
                    res = tx.send(FileChanged) => res.is_ok(),
                };
                if !sent {
                    debug!("file change receiver dropped; watch loop exiting");
                    return;
                }
            }

            event = events.recv() => match event {
                None => {
                    debug!("notify event stream closed");
                    return;
                }
                Some(Err(err)) => warn!(error = %err, "file watch error"),
                Some(Ok(event)) => {
                    for dir in created_dirs(root, &event) {
                        on_new_dir(dir);
                    }
                    if is_source_change(root, &event) {
                        debug!(kind = ?event.kind, paths = ?event.paths, "source change");
                        deadline = Some(Instant::now() + quiet);
                    }
                }
            },
        }
    }
}

async fn wait_for_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
