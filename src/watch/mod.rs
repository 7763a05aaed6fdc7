// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Enumerating the non-hidden directories under the root ([`tree`]).
//! - Deciding which notify events are source changes ([`filter`]).
//! - Wiring up `notify` and debouncing bursts of changes into a single
//!   `FileChanged` signal ([`watcher`]).
//!
//! It does **not** know about run state; the dispatcher decides what a
//! change means.

pub mod filter;
pub mod path_utils;
pub mod tree;
pub mod watcher;

pub use filter::{is_source_change, is_tracked_kind, is_tracked_path, TRACKED_EXTENSION};
pub use tree::watch_dirs;
pub use watcher::{watch_loop, FileWatcher, NotifyEvents, DEBOUNCE_QUIET};
