// src/exec/command.rs

use std::path::PathBuf;

use tokio::process::Command;

use crate::config::SharedConfig;
use crate::display::command_line;
use crate::errors::{GotestWatchError, Result};

/// Everything one run needs from the configuration, captured under a single
/// read lock so a handler running concurrently cannot tear it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestInvocation {
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub clear_screen: bool,
    pub color: bool,
}

impl TestInvocation {
    pub fn from_config(config: &SharedConfig) -> Self {
        let cfg = config.read();
        Self {
            args: cfg.build_args(),
            working_dir: cfg.working_dir.clone(),
            clear_screen: cfg.clear_screen,
            color: cfg.color,
        }
    }

    /// The exact invocation as shown to the operator.
    pub fn command_line(&self) -> String {
        command_line(&self.args)
    }

    /// Build the process command: the first token is the program, the rest
    /// are passed as arguments verbatim (no shell).
    pub fn to_command(&self) -> Result<Command> {
        let (program, args) = self
            .args
            .split_first()
            .filter(|(program, _)| !program.is_empty())
            .ok_or_else(|| GotestWatchError::ConfigError("test command is empty".to_string()))?;

        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        Ok(cmd)
    }
}
