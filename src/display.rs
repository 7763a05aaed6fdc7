// src/display.rs

//! Terminal output shared by the dispatcher, the runner and handlers.

use std::io::{self, Write};

/// ANSI sequence: cursor home + clear screen.
pub const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

pub const PROMPT: &str = "> ";

/// Print the input prompt (no newline) and flush so it shows immediately.
pub fn display_prompt(out: &mut dyn Write) -> io::Result<()> {
    out.write_all(PROMPT.as_bytes())?;
    out.flush()
}

/// Render a token list the way it is shown before a run.
pub fn command_line(args: &[String]) -> String {
    args.join(" ")
}
