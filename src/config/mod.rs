// src/config/mod.rs

//! Configuration for gotest-watch.
//!
//! Responsibilities:
//! - Define the run-parameter record and its shared handle (`model.rs`).
//! - Load an optional YAML config file from disk (`loader.rs`).
//! - Merge defaults, file and CLI layers and check invariants (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{find_config_file, load_from_path, load_or_default};
pub use model::{RawTestConfig, SharedConfig, TestConfig, DEFAULT_TEST_PATH};
pub use validate::{merge_layers, validate_config};
