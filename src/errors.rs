// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GotestWatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("unknown command: {0:?}")]
    UnknownCommand(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("path {0:?} is not a directory")]
    NotADirectory(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, GotestWatchError>;
