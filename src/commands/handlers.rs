// src/commands/handlers.rs

//! Handlers for the interactive commands.
//!
//! Each handler mutates the shared configuration (if at all), writes a
//! one-line acknowledgment to `out`, and returns an error for invalid input.
//! On error the configuration is left unchanged.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::model::{default_command_base, SharedConfig, DEFAULT_TEST_PATH};
use crate::display::CLEAR_SCREEN;
use crate::errors::{GotestWatchError, Result};

fn enabled(value: bool) -> &'static str {
    if value { "enabled" } else { "disabled" }
}

pub fn handle_verbose(config: &SharedConfig, _args: &[String], out: &mut dyn Write) -> Result<()> {
    let value = {
        let mut cfg = config.write();
        cfg.verbose = !cfg.verbose;
        cfg.verbose
    };
    writeln!(out, "Verbose: {}", enabled(value))?;
    Ok(())
}

pub fn handle_race(config: &SharedConfig, _args: &[String], out: &mut dyn Write) -> Result<()> {
    let value = {
        let mut cfg = config.write();
        cfg.race = !cfg.race;
        cfg.race
    };
    writeln!(out, "Race: {}", enabled(value))?;
    Ok(())
}

pub fn handle_fail_fast(
    config: &SharedConfig,
    _args: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    let value = {
        let mut cfg = config.write();
        cfg.fail_fast = !cfg.fail_fast;
        cfg.fail_fast
    };
    writeln!(out, "FailFast: {}", enabled(value))?;
    Ok(())
}

pub fn handle_cover(config: &SharedConfig, _args: &[String], out: &mut dyn Write) -> Result<()> {
    let value = {
        let mut cfg = config.write();
        cfg.cover = !cfg.cover;
        cfg.cover
    };
    writeln!(out, "Cover: {}", enabled(value))?;
    Ok(())
}

pub fn handle_color(config: &SharedConfig, _args: &[String], out: &mut dyn Write) -> Result<()> {
    let value = {
        let mut cfg = config.write();
        cfg.color = !cfg.color;
        cfg.color
    };
    writeln!(out, "Color: {}", enabled(value))?;
    Ok(())
}

pub fn handle_count(config: &SharedConfig, args: &[String], out: &mut dyn Write) -> Result<()> {
    let count = match args.first() {
        None => 0,
        Some(raw) => parse_count(raw)?,
    };

    config.write().count = count;
    if count == 0 {
        writeln!(out, "Count: cleared")?;
    } else {
        writeln!(out, "Count: {count}")?;
    }
    Ok(())
}

fn parse_count(raw: &str) -> Result<u32> {
    match raw.parse::<i64>() {
        Ok(n) if n < 0 => Err(GotestWatchError::InvalidArgument(format!(
            "count value must be non-negative (got {n})"
        ))),
        Ok(n) => u32::try_from(n).map_err(|_| {
            GotestWatchError::InvalidArgument(format!("count value {n} is too large"))
        }),
        Err(_) => Err(GotestWatchError::InvalidArgument(format!(
            "invalid count value {raw:?} (must be a non-negative integer)"
        ))),
    }
}

pub fn handle_run_pattern(
    config: &SharedConfig,
    args: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    match args.first() {
        None => {
            config.write().run_pattern.clear();
            writeln!(out, "Run pattern: cleared")?;
        }
        Some(pattern) => {
            config.write().run_pattern = pattern.clone();
            writeln!(out, "Run pattern: {pattern}")?;
        }
    }
    Ok(())
}

pub fn handle_skip_pattern(
    config: &SharedConfig,
    args: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    match args.first() {
        None => {
            config.write().skip_pattern.clear();
            writeln!(out, "Skip pattern: cleared")?;
        }
        Some(pattern) => {
            config.write().skip_pattern = pattern.clone();
            writeln!(out, "Skip pattern: {pattern}")?;
        }
    }
    Ok(())
}

pub fn handle_test_path(config: &SharedConfig, args: &[String], out: &mut dyn Write) -> Result<()> {
    let path = match args.first() {
        None => DEFAULT_TEST_PATH.to_string(),
        Some(path) => {
            let base = config.read().working_dir.clone();
            check_test_dir(path, base.as_deref())?;
            path.clone()
        }
    };

    config.write().test_path = path.clone();
    writeln!(out, "Test path: {path}")?;
    Ok(())
}

/// The directory a test path refers to.
///
/// A trailing `/...` (the Go "and all sub-packages" wildcard) is stripped;
/// relative paths resolve against `base` when one is set.
pub fn test_path_dir(path: &str, base: Option<&Path>) -> PathBuf {
    let trimmed = match path.strip_suffix("...") {
        Some(rest) if rest.is_empty() => ".",
        Some(rest) => rest.trim_end_matches('/'),
        None => path,
    };
    let trimmed = if trimmed.is_empty() { "/" } else { trimmed };

    let dir = PathBuf::from(trimmed);
    match base {
        Some(base) if dir.is_relative() => base.join(dir),
        _ => dir,
    }
}

fn check_test_dir(path: &str, base: Option<&Path>) -> Result<()> {
    let dir = test_path_dir(path, base);
    let meta = std::fs::metadata(&dir)
        .map_err(|e| GotestWatchError::PathNotFound(format!("{path}: {e}")))?;
    if !meta.is_dir() {
        return Err(GotestWatchError::NotADirectory(path.to_string()));
    }
    Ok(())
}

pub fn handle_command_base(
    config: &SharedConfig,
    args: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    let base = if args.is_empty() {
        default_command_base()
    } else {
        args.to_vec()
    };

    let shown = base.join(" ");
    config.write().command_base = base;
    writeln!(out, "Test command: {shown}")?;
    Ok(())
}

pub fn handle_clear(config: &SharedConfig, _args: &[String], out: &mut dyn Write) -> Result<()> {
    config.write().clear_parameters();
    writeln!(out, "All parameters cleared")?;
    Ok(())
}

pub fn handle_clear_screen(
    _config: &SharedConfig,
    _args: &[String],
    out: &mut dyn Write,
) -> Result<()> {
    write!(out, "{CLEAR_SCREEN}")?;
    out.flush()?;
    Ok(())
}

/// The dispatcher starts the run itself; nothing to do here.
pub fn handle_force_run(
    _config: &SharedConfig,
    _args: &[String],
    _out: &mut dyn Write,
) -> Result<()> {
    Ok(())
}

pub const HELP_TEXT: &str = "\
Available commands:
  v            Toggle verbose mode (-v flag)
  race         Toggle race mode (-race flag)
  ff           Toggle failfast mode (-failfast flag)
  cover        Toggle coverage (-cover flag)
  color        Toggle colored output
  count <n>    Set test count (-count=<n>, n > 0)
  count        Clear count
  r <pattern>  Set test run pattern (-run=<pattern>)
  r            Clear run pattern
  s <pattern>  Set test skip pattern (-skip=<pattern>)
  s            Clear skip pattern
  p <path>     Set test path (default: ./...)
  p            Set test path to default (./...)
  cmd <cmd>    Set the base command to run
  cmd          Reset the base command (go test)
  clear        Clear all parameters
  cls          Clear screen
  f            Force test run
  h, help      Show this help
";

pub fn handle_help(_config: &SharedConfig, _args: &[String], out: &mut dyn Write) -> Result<()> {
    out.write_all(HELP_TEXT.as_bytes())?;
    Ok(())
}
