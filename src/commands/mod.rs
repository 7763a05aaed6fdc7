// src/commands/mod.rs

//! Interactive command catalog.
//!
//! The registry is an explicit table built once at startup and handed to the
//! dispatcher by reference. The dispatcher only needs to know which name is
//! the force-run command; everything else goes through [`CommandRegistry::execute`].

pub mod handlers;

use std::collections::HashMap;
use std::io::Write;

use crate::config::SharedConfig;
use crate::engine::FORCE_RUN_COMMAND;
use crate::errors::{GotestWatchError, Result};

use handlers::*;

/// Signature shared by every command handler.
pub type CommandHandler = fn(&SharedConfig, &[String], &mut dyn Write) -> Result<()>;

/// Name routed to the help channel instead of the command channel.
pub const HELP_COMMAND: &str = "h";
pub const HELP_COMMAND_LONG: &str = "help";

/// Whether `name` asks for help (routed separately; never starts a run).
pub fn is_help_command(name: &str) -> bool {
    name == HELP_COMMAND || name == HELP_COMMAND_LONG
}

/// Table of command name -> handler.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, CommandHandler>,
}

impl CommandRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// The full built-in command set.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("v", handle_verbose);
        registry.register("race", handle_race);
        registry.register("ff", handle_fail_fast);
        registry.register("cover", handle_cover);
        registry.register("color", handle_color);
        registry.register("count", handle_count);
        registry.register("r", handle_run_pattern);
        registry.register("s", handle_skip_pattern);
        registry.register("p", handle_test_path);
        registry.register("cmd", handle_command_base);
        registry.register("clear", handle_clear);
        registry.register("cls", handle_clear_screen);
        registry.register(FORCE_RUN_COMMAND, handle_force_run);
        registry.register(HELP_COMMAND, handle_help);
        registry.register(HELP_COMMAND_LONG, handle_help);
        registry
    }

    pub fn register(&mut self, name: &'static str, handler: CommandHandler) {
        self.handlers.insert(name, handler);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Run the handler registered under `name`.
    pub fn execute(
        &self,
        name: &str,
        config: &SharedConfig,
        args: &[String],
        out: &mut dyn Write,
    ) -> Result<()> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| GotestWatchError::UnknownCommand(name.to_string()))?;
        handler(config, args, out)
    }

    /// Run the help handler.
    pub fn help(&self, config: &SharedConfig, out: &mut dyn Write) -> Result<()> {
        self.execute(HELP_COMMAND, config, &[], out)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
