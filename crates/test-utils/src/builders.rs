#![allow(dead_code)]

use std::path::PathBuf;

use gotest_watch::config::{SharedConfig, TestConfig};

/// Builder for `TestConfig` to simplify test setup.
pub struct TestConfigBuilder {
    config: TestConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: TestConfig::default(),
        }
    }

    /// Base command from a whitespace-separated string, e.g. `"sh -c"`.
    pub fn command(mut self, cmd: &str) -> Self {
        self.config.command_base = cmd.split_whitespace().map(str::to_string).collect();
        self
    }

    /// Base command from explicit tokens (for arguments containing spaces).
    pub fn command_tokens(mut self, tokens: &[&str]) -> Self {
        self.config.command_base = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn test_path(mut self, path: &str) -> Self {
        self.config.test_path = path.to_string();
        self
    }

    pub fn verbose(mut self, val: bool) -> Self {
        self.config.verbose = val;
        self
    }

    pub fn race(mut self, val: bool) -> Self {
        self.config.race = val;
        self
    }

    pub fn fail_fast(mut self, val: bool) -> Self {
        self.config.fail_fast = val;
        self
    }

    pub fn cover(mut self, val: bool) -> Self {
        self.config.cover = val;
        self
    }

    pub fn clear_screen(mut self, val: bool) -> Self {
        self.config.clear_screen = val;
        self
    }

    pub fn color(mut self, val: bool) -> Self {
        self.config.color = val;
        self
    }

    pub fn count(mut self, n: u32) -> Self {
        self.config.count = n;
        self
    }

    pub fn run_pattern(mut self, pattern: &str) -> Self {
        self.config.run_pattern = pattern.to_string();
        self
    }

    pub fn skip_pattern(mut self, pattern: &str) -> Self {
        self.config.skip_pattern = pattern.to_string();
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.working_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> TestConfig {
        self.config
    }

    pub fn shared(self) -> SharedConfig {
        SharedConfig::new(self.config)
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
