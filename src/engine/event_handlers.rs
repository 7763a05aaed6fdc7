// src/engine/event_handlers.rs

//! Event handling logic for the dispatcher core.

use tracing::{debug, warn};

use crate::engine::{CommandRequest, RunState, RunTrigger};

/// Action produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchAction {
    /// Invoke the registered handler for this command.
    ExecuteCommand(CommandRequest),
    /// Invoke the help handler.
    ShowHelp,
    /// Spawn a test runner in the background.
    StartRun(RunTrigger),
    /// Send `false` on the gate: the reader stops consuming input.
    CloseGate,
    /// Send `true` on the gate: the reader resumes consuming input.
    OpenGate,
    /// Print the blank line separating one run's output from the prompt.
    PrintSeparator,
    /// Print the input prompt.
    ShowPrompt,
}

/// Decision returned by the core after handling a single `Message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchStep {
    /// Actions the IO shell should execute, in order.
    pub actions: Vec<DispatchAction>,
    /// State after the message was applied.
    pub state: RunState,
}

impl DispatchStep {
    fn new(state: RunState, actions: Vec<DispatchAction>) -> Self {
        Self { actions, state }
    }

    /// Whether this step launches a run.
    pub fn starts_run(&self) -> bool {
        self.actions
            .iter()
            .any(|a| matches!(a, DispatchAction::StartRun(_)))
    }
}

/// What the shell must do once cancellation is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPlan {
    /// No run in flight; exit right away.
    Immediate,
    /// A run is in flight; wait (bounded) for its completion first.
    AwaitRunCompletion,
}

/// Start a run from idle: spawn first, then close the gate.
fn start_run(trigger: RunTrigger, mut actions: Vec<DispatchAction>) -> DispatchStep {
    actions.push(DispatchAction::StartRun(trigger));
    actions.push(DispatchAction::CloseGate);
    DispatchStep::new(RunState::Running, actions)
}

/// Handle a debounced file-change signal.
pub fn handle_file_changed(state: RunState) -> DispatchStep {
    match state {
        RunState::Idle => start_run(RunTrigger::FileChange, Vec::new()),
        RunState::Running => {
            debug!("file change while tests are running; dropped");
            DispatchStep::new(state, Vec::new())
        }
    }
}

/// Handle a parsed command line.
///
/// The handler always runs before the force-run spawn so its output appears
/// ahead of the test command line.
pub fn handle_command(state: RunState, request: CommandRequest) -> DispatchStep {
    match state {
        RunState::Idle => {
            let force_run = request.is_force_run();
            let actions = vec![DispatchAction::ExecuteCommand(request)];
            if force_run {
                start_run(RunTrigger::ForceRun, actions)
            } else {
                let mut actions = actions;
                actions.push(DispatchAction::ShowPrompt);
                DispatchStep::new(RunState::Idle, actions)
            }
        }
        RunState::Running => {
            debug!(command = %request.name, "command while tests are running; dropped");
            DispatchStep::new(state, Vec::new())
        }
    }
}

/// Handle a help request. Help never starts a run.
pub fn handle_help(state: RunState) -> DispatchStep {
    match state {
        RunState::Idle => DispatchStep::new(
            RunState::Idle,
            vec![DispatchAction::ShowHelp, DispatchAction::ShowPrompt],
        ),
        RunState::Running => {
            debug!("help request while tests are running; dropped");
            DispatchStep::new(state, Vec::new())
        }
    }
}

/// Handle the completion of the in-flight run.
pub fn handle_run_complete(state: RunState) -> DispatchStep {
    match state {
        RunState::Running => DispatchStep::new(
            RunState::Idle,
            vec![
                DispatchAction::OpenGate,
                DispatchAction::PrintSeparator,
                DispatchAction::ShowPrompt,
            ],
        ),
        RunState::Idle => {
            warn!("run completion received while idle; ignoring");
            DispatchStep::new(state, Vec::new())
        }
    }
}
