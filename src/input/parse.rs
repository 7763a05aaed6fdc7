// src/input/parse.rs

use crate::engine::CommandRequest;

/// Parse one input line into a command.
///
/// Surrounding whitespace is trimmed and the rest split on runs of
/// whitespace: the first token is the name, the others are arguments.
/// Returns `None` for a blank line.
pub fn parse_command(line: &str) -> Option<CommandRequest> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?;
    Some(CommandRequest::new(name, tokens.map(str::to_string).collect()))
}
