// src/engine/runtime.rs

use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::commands::CommandRegistry;
use crate::config::SharedConfig;
use crate::display::display_prompt;
use crate::errors::Result;
use crate::exec::RunLauncher;

use super::core::DispatchCore;
use super::event_handlers::{DispatchAction, ShutdownPlan};
use super::{
    CommandRequest, FileChanged, HelpRequest, Message, RunComplete, RunTrigger, ShutdownOutcome,
    SHUTDOWN_TIMEOUT,
};

/// Announcement printed before a run caused by a source change.
pub const FILE_CHANGE_NOTICE: &str = "File change detected, running tests...";

pub const SHUTDOWN_NOTICE: &str = "Shutting down...";

/// Synchronous text destination (acknowledgments, prompt, errors).
pub type OutputStream = Box<dyn Write + Send>;

/// The dispatcher's ends of every channel.
#[derive(Debug)]
pub struct DispatcherChannels {
    pub file_rx: mpsc::Receiver<FileChanged>,
    pub command_rx: mpsc::Receiver<CommandRequest>,
    pub help_rx: mpsc::Receiver<HelpRequest>,
    pub complete_rx: mpsc::Receiver<RunComplete>,
    pub gate_tx: watch::Sender<bool>,
}

#[derive(Debug, Clone, Copy)]
pub struct DispatcherOptions {
    /// Upper bound on waiting for an in-flight run during shutdown.
    pub shutdown_timeout: Duration,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            shutdown_timeout: SHUTDOWN_TIMEOUT,
        }
    }
}

/// Async shell around [`DispatchCore`].
///
/// Selects over the producer channels and cancellation, feeds each message
/// to the core and performs the returned actions: running command handlers,
/// printing, launching runs through a [`RunLauncher`] and driving the gate.
pub struct Dispatcher<L: RunLauncher> {
    core: DispatchCore,
    registry: CommandRegistry,
    config: SharedConfig,
    channels: DispatcherChannels,
    launcher: L,
    cancel: CancellationToken,
    options: DispatcherOptions,
    out: OutputStream,
    err: OutputStream,
}

impl<L: RunLauncher> fmt::Debug for Dispatcher<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("core", &self.core)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<L: RunLauncher> Dispatcher<L> {
    /// A dispatcher in the idle state, writing to stdout/stderr.
    pub fn new(
        config: SharedConfig,
        registry: CommandRegistry,
        channels: DispatcherChannels,
        launcher: L,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            core: DispatchCore::new(),
            registry,
            config,
            channels,
            launcher,
            cancel,
            options: DispatcherOptions::default(),
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
        }
    }

    pub fn with_options(mut self, options: DispatcherOptions) -> Self {
        self.options = options;
        self
    }

    /// Redirect normal output and error output.
    pub fn with_output(mut self, out: OutputStream, err: OutputStream) -> Self {
        self.out = out;
        self.err = err;
        self
    }

    /// Main loop.
    ///
    /// Opens the gate and shows the prompt, then handles messages until the
    /// cancellation token fires or every producer is gone. Cancellation is
    /// checked first on each iteration so shutdown is never starved.
    pub async fn run(mut self) -> Result<ShutdownOutcome> {
        info!("dispatcher started");
        self.set_gate(true);
        self.write_out(|out| display_prompt(out));

        loop {
            let message = tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    debug!("dispatcher observed cancellation");
                    break;
                }
                Some(RunComplete) = self.channels.complete_rx.recv() => Message::RunComplete,
                Some(FileChanged) = self.channels.file_rx.recv() => Message::FileChanged,
                Some(request) = self.channels.command_rx.recv() => Message::Command(request),
                Some(HelpRequest) = self.channels.help_rx.recv() => Message::Help,
                else => {
                    info!("all producer channels closed; dispatcher exiting");
                    break;
                }
            };

            debug!(?message, state = ?self.core.state(), "dispatcher received message");
            self.handle(message);
        }

        self.shutdown().await
    }

    fn handle(&mut self, message: Message) {
        let step = self.core.step(message);
        for action in step.actions {
            self.perform(action);
        }
    }

    fn perform(&mut self, action: DispatchAction) {
        match action {
            DispatchAction::ExecuteCommand(request) => {
                debug!(name = %request.name, args = ?request.args, "executing command");
                let result =
                    self.registry
                        .execute(&request.name, &self.config, &request.args, &mut *self.out);
                if let Err(err) = result {
                    self.write_err(|out| writeln!(out, "Error: {err}"));
                }
            }
            DispatchAction::ShowHelp => {
                if let Err(err) = self.registry.help(&self.config, &mut *self.out) {
                    self.write_err(|out| writeln!(out, "Error: {err}"));
                }
            }
            DispatchAction::StartRun(trigger) => {
                if trigger == RunTrigger::FileChange {
                    self.write_out(|out| writeln!(out, "{FILE_CHANGE_NOTICE}"));
                }
                info!(?trigger, "starting test run");
                self.launcher.launch(trigger);
            }
            DispatchAction::CloseGate => self.set_gate(false),
            DispatchAction::OpenGate => self.set_gate(true),
            DispatchAction::PrintSeparator => self.write_out(|out| writeln!(out)),
            DispatchAction::ShowPrompt => self.write_out(|out| display_prompt(out)),
        }
    }

    async fn shutdown(mut self) -> Result<ShutdownOutcome> {
        let outcome = match self.core.shutdown_plan() {
            ShutdownPlan::Immediate => ShutdownOutcome::Clean,
            ShutdownPlan::AwaitRunCompletion => self.await_in_flight_run().await,
        };

        self.write_out(|out| writeln!(out, "{SHUTDOWN_NOTICE}"));
        info!(?outcome, "dispatcher stopped");
        Ok(outcome)
    }

    async fn await_in_flight_run(&mut self) -> ShutdownOutcome {
        let limit = self.options.shutdown_timeout;
        info!(?limit, "waiting for in-flight test run");

        match tokio::time::timeout(limit, self.channels.complete_rx.recv()).await {
            Ok(Some(RunComplete)) => {
                self.core.step(Message::RunComplete);
                ShutdownOutcome::Clean
            }
            Ok(None) => {
                debug!("completion channel closed during shutdown");
                ShutdownOutcome::Clean
            }
            Err(_) => {
                warn!(?limit, "test run did not finish before shutdown timeout");
                self.write_err(|out| {
                    writeln!(
                        out,
                        "Test run did not finish within {}s; exiting anyway",
                        limit.as_secs_f64()
                    )
                });
                ShutdownOutcome::TimedOut
            }
        }
    }

    fn set_gate(&self, open: bool) {
        // `send_replace` stores the value even when the reader is gone.
        self.channels.gate_tx.send_replace(open);
        debug!(open, "gate updated");
    }

    fn write_out(&mut self, f: impl FnOnce(&mut dyn Write) -> io::Result<()>) {
        if let Err(err) = f(&mut *self.out).and_then(|()| self.out.flush()) {
            warn!(error = %err, "failed to write output");
        }
    }

    fn write_err(&mut self, f: impl FnOnce(&mut dyn Write) -> io::Result<()>) {
        if let Err(err) = f(&mut *self.err).and_then(|()| self.err.flush()) {
            warn!(error = %err, "failed to write error output");
        }
    }
}
