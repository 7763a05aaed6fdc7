//! A dispatcher running on a background task with every channel end and
//! output stream exposed to the test.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use gotest_watch::commands::CommandRegistry;
use gotest_watch::config::SharedConfig;
use gotest_watch::engine::{
    Dispatcher, DispatcherChannels, DispatcherOptions, FileChanged, HelpRequest, RunComplete,
    ShutdownOutcome,
};
use gotest_watch::errors::Result;
use gotest_watch::input::parse_command;

use crate::capture::SharedBuffer;
use crate::fake_launcher::{FakeLauncher, LaunchLog};
use crate::with_timeout;

/// How the harness's fake launcher reports completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// The test sends `RunComplete` through [`DispatcherHarness::complete_run`].
    Manual,
    /// Every launch completes immediately.
    Completing,
}

pub struct DispatcherHarness {
    pub file_tx: mpsc::Sender<FileChanged>,
    pub command_tx: mpsc::Sender<gotest_watch::engine::CommandRequest>,
    pub help_tx: mpsc::Sender<HelpRequest>,
    pub complete_tx: mpsc::Sender<RunComplete>,
    pub gate_rx: watch::Receiver<bool>,
    pub cancel: CancellationToken,
    pub config: SharedConfig,
    pub out: SharedBuffer,
    pub err: SharedBuffer,
    pub launches: LaunchLog,
    handle: JoinHandle<Result<ShutdownOutcome>>,
}

impl DispatcherHarness {
    /// Spawn the dispatcher and wait until it has opened the gate on entry.
    pub async fn spawn(config: SharedConfig, mode: LaunchMode) -> Self {
        Self::spawn_with_options(config, mode, DispatcherOptions::default()).await
    }

    /// The gate starts out `false`, so returning before the dispatcher has
    /// opened it would let a later `wait_for_gate(false)` pass vacuously.
    pub async fn spawn_with_options(
        config: SharedConfig,
        mode: LaunchMode,
        options: DispatcherOptions,
    ) -> Self {
        let (file_tx, file_rx) = mpsc::channel(10);
        let (command_tx, command_rx) = mpsc::channel(10);
        let (help_tx, help_rx) = mpsc::channel(10);
        let (complete_tx, complete_rx) = mpsc::channel(10);
        let (gate_tx, gate_rx) = watch::channel(false);
        let cancel = CancellationToken::new();
        let out = SharedBuffer::new();
        let err = SharedBuffer::new();

        let launcher = match mode {
            LaunchMode::Manual => FakeLauncher::manual(),
            LaunchMode::Completing => FakeLauncher::completing(complete_tx.clone()),
        };
        let launches = launcher.log();

        let channels = DispatcherChannels {
            file_rx,
            command_rx,
            help_rx,
            complete_rx,
            gate_tx,
        };

        let dispatcher = Dispatcher::new(
            config.clone(),
            CommandRegistry::with_defaults(),
            channels,
            launcher,
            cancel.clone(),
        )
        .with_options(options)
        .with_output(out.boxed(), err.boxed());

        let handle = tokio::spawn(dispatcher.run());

        let mut harness = Self {
            file_tx,
            command_tx,
            help_tx,
            complete_tx,
            gate_rx,
            cancel,
            config,
            out,
            err,
            launches,
            handle,
        };
        harness.wait_for_gate(true).await;
        harness
    }

    /// Send a line as the reader would (help goes to the help channel).
    pub async fn send_line(&self, line: &str) {
        let request = parse_command(line).expect("non-empty command line");
        if gotest_watch::commands::is_help_command(&request.name) {
            self.help_tx.send(HelpRequest).await.expect("help channel open");
        } else {
            self.command_tx.send(request).await.expect("command channel open");
        }
    }

    pub async fn file_changed(&self) {
        self.file_tx.send(FileChanged).await.expect("file channel open");
    }

    pub async fn complete_run(&self) {
        self.complete_tx
            .send(RunComplete)
            .await
            .expect("completion channel open");
    }

    /// Wait until the gate holds `open`.
    pub async fn wait_for_gate(&mut self, open: bool) {
        with_timeout(self.gate_rx.wait_for(|v| *v == open))
            .await
            .expect("gate sender alive");
    }

    /// Wait until stdout contains `needle` `times` times.
    pub async fn wait_for_output(&self, needle: &str, times: usize) {
        let out = self.out.clone();
        with_timeout(async move {
            while out.contents().matches(needle).count() < times {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
    }

    /// Wait until stderr contains `needle`.
    pub async fn wait_for_error(&self, needle: &str) {
        let err = self.err.clone();
        with_timeout(async move {
            while !err.contents().contains(needle) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
    }

    /// Give the dispatcher time to process anything already queued.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    /// Cancel and wait for the dispatcher to return.
    pub async fn shutdown(self) -> ShutdownOutcome {
        self.cancel.cancel();
        self.join().await
    }

    /// Wait for the dispatcher to return on its own.
    pub async fn join(self) -> ShutdownOutcome {
        with_timeout(self.handle)
            .await
            .expect("dispatcher task panicked")
            .expect("dispatcher returned an error")
    }
}
