// src/engine/core.rs

//! Pure dispatcher state machine.
//!
//! This module contains a synchronous, deterministic core that consumes
//! [`Message`]s and produces:
//! - the new run state
//! - a list of [`DispatchAction`]s describing what the IO shell should do
//!
//! The async shell (`engine::runtime::Dispatcher`) is responsible for:
//! - selecting over the producer channels
//! - running command handlers and printing
//! - spawning runners and sending gate values
//! - the shutdown wait
//!
//! The core has no channels, no Tokio types, and performs no IO, so every
//! transition can be unit tested directly.

use crate::engine::event_handlers::{
    handle_command, handle_file_changed, handle_help, handle_run_complete, DispatchStep,
    ShutdownPlan,
};
use crate::engine::{Message, RunState};

/// Owner of the idle/running state.
///
/// Only the dispatcher holds one; no other component reads or writes the
/// run state.
#[derive(Debug, Default)]
pub struct DispatchCore {
    state: RunState,
}

impl DispatchCore {
    /// A core in the `Idle` state (after the startup run has completed).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Handle a single message, updating the state and returning the actions
    /// for the IO shell.
    pub fn step(&mut self, message: Message) -> DispatchStep {
        let step = match message {
            Message::FileChanged => handle_file_changed(self.state),
            Message::Command(request) => handle_command(self.state, request),
            Message::Help => handle_help(self.state),
            Message::RunComplete => handle_run_complete(self.state),
        };
        self.state = step.state;
        step
    }

    /// Decide how to shut down given the current state.
    pub fn shutdown_plan(&self) -> ShutdownPlan {
        match self.state {
            RunState::Idle => ShutdownPlan::Immediate,
            RunState::Running => ShutdownPlan::AwaitRunCompletion,
        }
    }
}
