// src/input/mod.rs

//! Operator input.
//!
//! - [`parse`] turns a line into a [`CommandRequest`](crate::engine::CommandRequest).
//! - [`reader`] runs the gated read loop that feeds the dispatcher.

pub mod parse;
pub mod reader;

pub use parse::parse_command;
pub use reader::{read_commands, ReaderChannels};
