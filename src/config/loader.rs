// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::model::RawTestConfig;
use crate::errors::Result;

/// Config file names looked up in the project directory, in priority order.
pub const CONFIG_FILE_NAMES: [&str; 2] = [".gotest-watch.yml", ".gotest-watch.yaml"];

/// Load a YAML config layer from a given path.
///
/// This only performs deserialization; merging with defaults and CLI flags
/// plus validation happen in [`crate::config::validate::merge_layers`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawTestConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    // An empty file (or one holding only `---`) deserializes to `null`.
    if contents.trim().trim_start_matches("---").trim().is_empty() {
        return Ok(RawTestConfig::default());
    }

    let config: RawTestConfig = serde_yaml::from_str(&contents)?;
    Ok(config)
}

/// Find the config file in `dir`, preferring `.gotest-watch.yml`.
pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Load the config layer for `dir`, or an empty layer.
///
/// A missing file is not an error. A file that fails to parse is logged and
/// ignored so the tool still starts with defaults.
pub fn load_or_default(dir: &Path) -> RawTestConfig {
    let Some(path) = find_config_file(dir) else {
        debug!(dir = %dir.display(), "no config file found; using defaults");
        return RawTestConfig::default();
    };

    match load_from_path(&path) {
        Ok(raw) => {
            debug!(path = %path.display(), "loaded config file");
            raw
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "failed to parse config file; using defaults"
            );
            RawTestConfig::default()
        }
    }
}
