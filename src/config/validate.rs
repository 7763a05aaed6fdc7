// src/config/validate.rs

use crate::config::model::{RawTestConfig, TestConfig};
use crate::errors::{GotestWatchError, Result};

/// Build a validated `TestConfig` from the defaults plus an ordered list of
/// layers (config file first, CLI flags last).
pub fn merge_layers<'a, I>(layers: I) -> Result<TestConfig>
where
    I: IntoIterator<Item = &'a RawTestConfig>,
{
    let mut config = TestConfig::default();
    for layer in layers {
        layer.apply_to(&mut config);
    }
    normalize(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Check the invariants every `TestConfig` must hold before a run.
pub fn validate_config(config: &TestConfig) -> Result<()> {
    ensure_command_base(config)?;
    ensure_test_path(config)?;
    Ok(())
}

fn normalize(config: &mut TestConfig) {
    // `workingDir: ""` in YAML means "no override".
    if config
        .working_dir
        .as_ref()
        .is_some_and(|dir| dir.as_os_str().is_empty())
    {
        config.working_dir = None;
    }
}

fn ensure_command_base(config: &TestConfig) -> Result<()> {
    if config.command_base.iter().all(|t| t.trim().is_empty()) {
        return Err(GotestWatchError::ConfigError(
            "commandBase must contain at least one token".to_string(),
        ));
    }
    Ok(())
}

fn ensure_test_path(config: &TestConfig) -> Result<()> {
    if config.test_path.trim().is_empty() {
        return Err(GotestWatchError::ConfigError(
            "testPath must not be empty".to_string(),
        ));
    }
    Ok(())
}
