// src/engine/mod.rs

//! Orchestration engine for gotest-watch.
//!
//! This module ties together the events produced by:
//!   - the file watcher (`FileChanged`)
//!   - the stdin reader (`Command`, `Help`)
//!   - the test runner (`RunComplete`)
//!   - shutdown (the shared cancellation token)
//!
//! The pure idle/running state machine lives in [`core`]; the async/IO shell
//! that selects over the channels is implemented in [`runtime`].

use std::time::Duration;

/// Name of the command that forces a test run.
pub const FORCE_RUN_COMMAND: &str = "f";

/// How long shutdown waits for an in-flight run before giving up.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Signal from the watcher: watched sources changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileChanged;

/// Signal from the reader: the operator asked for help.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpRequest;

/// Signal from a runner: the test process finished (whatever its outcome).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunComplete;

/// A parsed input line: command name plus whitespace-separated arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    pub fn is_force_run(&self) -> bool {
        self.name == FORCE_RUN_COMMAND
    }
}

/// Every event the dispatcher handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    FileChanged,
    Command(CommandRequest),
    Help,
    RunComplete,
}

/// Dispatcher run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

/// Why a test run was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTrigger {
    /// Watched `.go` sources changed.
    FileChange,
    /// The operator issued the force-run command.
    ForceRun,
}

/// How the dispatcher loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Shut down cleanly (idle, or the in-flight run completed in time).
    Clean,
    /// An in-flight run did not complete within the shutdown timeout.
    TimedOut,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use core::DispatchCore;
pub use event_handlers::{DispatchAction, DispatchStep, ShutdownPlan};
pub use runtime::{Dispatcher, DispatcherChannels, DispatcherOptions};
