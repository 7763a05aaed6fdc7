// src/exec/mod.rs

//! Test process execution.
//!
//! - [`command`] turns the shared configuration into a process invocation.
//! - [`runner`] runs one invocation, streams its output and always reports
//!   completion.
//! - [`colorize`] classifies and colors `go test` output lines.
//! - [`backend`] provides the `RunLauncher` trait the dispatcher uses, with
//!   the production `TestRunLauncher`; tests replace it with a fake.

pub mod backend;
pub mod colorize;
pub mod command;
pub mod runner;

pub use backend::{RunLauncher, TestRunLauncher};
pub use colorize::{classify, colorize, LineClass};
pub use command::TestInvocation;
pub use runner::{OutputSink, Runner, RunnerSinks};
