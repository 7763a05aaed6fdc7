// tests/dispatch_core.rs

use gotest_watch::engine::{
    CommandRequest, DispatchAction, DispatchCore, Message, RunState, RunTrigger, ShutdownPlan,
};

fn command(name: &str, args: &[&str]) -> Message {
    Message::Command(CommandRequest::new(
        name,
        args.iter().map(|a| a.to_string()).collect(),
    ))
}

fn running_core() -> DispatchCore {
    let mut core = DispatchCore::new();
    core.step(Message::FileChanged);
    assert_eq!(core.state(), RunState::Running);
    core
}

#[test]
fn starts_idle_and_shuts_down_immediately() {
    let core = DispatchCore::new();
    assert_eq!(core.state(), RunState::Idle);
    assert!(!core.is_running());
    assert_eq!(core.shutdown_plan(), ShutdownPlan::Immediate);
}

#[test]
fn file_change_while_idle_starts_run_then_closes_gate() {
    let mut core = DispatchCore::new();
    let step = core.step(Message::FileChanged);

    assert_eq!(
        step.actions,
        vec![
            DispatchAction::StartRun(RunTrigger::FileChange),
            DispatchAction::CloseGate,
        ]
    );
    assert_eq!(step.state, RunState::Running);
    assert!(step.starts_run());
    assert_eq!(core.shutdown_plan(), ShutdownPlan::AwaitRunCompletion);
}

#[test]
fn ordinary_command_runs_handler_and_reprompts() {
    let mut core = DispatchCore::new();
    let step = core.step(command("v", &[]));

    assert_eq!(
        step.actions,
        vec![
            DispatchAction::ExecuteCommand(CommandRequest::new("v", vec![])),
            DispatchAction::ShowPrompt,
        ]
    );
    assert_eq!(core.state(), RunState::Idle);
    assert!(!step.starts_run());
}

#[test]
fn force_run_executes_handler_before_starting_run() {
    let mut core = DispatchCore::new();
    let step = core.step(command("f", &[]));

    assert_eq!(
        step.actions,
        vec![
            DispatchAction::ExecuteCommand(CommandRequest::new("f", vec![])),
            DispatchAction::StartRun(RunTrigger::ForceRun),
            DispatchAction::CloseGate,
        ]
    );
    assert_eq!(core.state(), RunState::Running);
}

#[test]
fn help_never_starts_a_run() {
    let mut core = DispatchCore::new();
    let step = core.step(Message::Help);

    assert_eq!(
        step.actions,
        vec![DispatchAction::ShowHelp, DispatchAction::ShowPrompt]
    );
    assert_eq!(core.state(), RunState::Idle);
}

#[test]
fn completion_reopens_gate_and_reprompts() {
    let mut core = running_core();
    let step = core.step(Message::RunComplete);

    assert_eq!(
        step.actions,
        vec![
            DispatchAction::OpenGate,
            DispatchAction::PrintSeparator,
            DispatchAction::ShowPrompt,
        ]
    );
    assert_eq!(core.state(), RunState::Idle);
}

#[test]
fn stray_completion_while_idle_is_ignored() {
    let mut core = DispatchCore::new();
    let step = core.step(Message::RunComplete);

    assert!(step.actions.is_empty());
    assert_eq!(core.state(), RunState::Idle);
}

#[test]
fn messages_while_running_are_dropped() {
    let mut core = running_core();

    for message in [
        Message::FileChanged,
        command("f", &[]),
        command("r", &["Foo"]),
        Message::Help,
    ] {
        let step = core.step(message);
        assert!(step.actions.is_empty(), "unexpected actions: {:?}", step.actions);
        assert_eq!(core.state(), RunState::Running);
    }
}

#[test]
fn at_most_one_run_per_idle_period() {
    let mut core = DispatchCore::new();
    let script = [
        Message::FileChanged,
        Message::FileChanged,
        command("f", &[]),
        Message::RunComplete,
        command("f", &[]),
        Message::FileChanged,
        Message::RunComplete,
        Message::RunComplete,
    ];

    let mut in_flight = 0;
    let mut started = 0;
    for message in script {
        let completes = message == Message::RunComplete && core.is_running();
        let step = core.step(message);
        if step.starts_run() {
            in_flight += 1;
            started += 1;
        }
        if completes {
            in_flight -= 1;
        }
        assert!(in_flight <= 1);
    }
    assert_eq!(started, 2);
    assert_eq!(core.state(), RunState::Idle);
}

#[test]
fn gate_closes_exactly_when_a_run_starts() {
    let mut core = DispatchCore::new();
    let script = [
        command("v", &[]),
        Message::Help,
        Message::FileChanged,
        Message::Help,
        Message::RunComplete,
        command("f", &[]),
        Message::RunComplete,
    ];

    for message in script {
        let step = core.step(message);
        let closes = step.actions.contains(&DispatchAction::CloseGate);
        assert_eq!(closes, step.starts_run());
        if step.actions.contains(&DispatchAction::OpenGate) {
            assert_eq!(step.state, RunState::Idle);
        }
    }
}
