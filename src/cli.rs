// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every run-parameter flag is optional: a flag overrides the config file
//! only when it is given on the command line.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::RawTestConfig;

/// Command-line arguments for `gotest-watch`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "gotest-watch",
    version,
    about = "An interactive command line tool for running `go test`.",
    long_about = "An interactive command line tool for running `go test`. It watches *.go \
                  files in your project for changes, and can be customized between runs to \
                  specify many of the flags that can be set for `go test`."
)]
pub struct CliArgs {
    /// Base command to run (e.g. "go test").
    #[arg(short = 'm', long = "cmd", value_name = "CMD")]
    pub command_base: Option<String>,

    /// Package path passed to the test command.
    #[arg(short = 'p', long = "path", value_name = "PATH")]
    pub test_path: Option<String>,

    /// Verbose test output.
    #[arg(
        short = 'v',
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub verbose: Option<bool>,

    /// Run tests that match this pattern.
    #[arg(short = 'r', long = "run", value_name = "PATTERN")]
    pub run_pattern: Option<String>,

    /// Skip tests that match this pattern.
    #[arg(short = 's', long = "skip", value_name = "PATTERN")]
    pub skip_pattern: Option<String>,

    /// Number of times to run each test.
    #[arg(short = 'n', long, value_name = "N")]
    pub count: Option<u32>,

    /// Clear the screen before each test run.
    #[arg(
        short = 'l',
        long = "cls",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub clear_screen: Option<bool>,

    /// ANSI color output.
    #[arg(
        short = 'c',
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub color: Option<bool>,

    /// Explicit config file (YAML).
    ///
    /// Default: `.gotest-watch.yml` or `.gotest-watch.yaml` in the current
    /// working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `GOTEST_WATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Append logs to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl CliArgs {
    /// The run-parameter flags that were given, as a config layer.
    pub fn config_layer(&self) -> RawTestConfig {
        RawTestConfig {
            command_base: self
                .command_base
                .as_ref()
                .map(|cmd| cmd.split_whitespace().map(str::to_string).collect()),
            test_path: self.test_path.clone(),
            verbose: self.verbose,
            race: None,
            fail_fast: None,
            cover: None,
            clear_screen: self.clear_screen,
            color: self.color,
            count: self.count,
            run_pattern: self.run_pattern.clone(),
            skip_pattern: self.skip_pattern.clone(),
            working_dir: None,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
