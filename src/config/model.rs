// src/config/model.rs

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Deserialize;

pub const DEFAULT_TEST_PATH: &str = "./...";

/// Default base command, as tokens.
pub fn default_command_base() -> Vec<String> {
    vec!["go".to_string(), "test".to_string()]
}

/// Run parameters for the test command.
///
/// Created once at startup (defaults, then the config file, then CLI flags)
/// and mutated in place by command handlers afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestConfig {
    pub command_base: Vec<String>,
    pub test_path: String,
    pub verbose: bool,
    pub race: bool,
    pub fail_fast: bool,
    pub cover: bool,
    pub clear_screen: bool,
    pub color: bool,
    /// Repeat count; 0 means "not set".
    pub count: u32,
    /// Include pattern (`-run=`). Empty when cleared.
    pub run_pattern: String,
    /// Exclude pattern (`-skip=`). Empty when cleared.
    pub skip_pattern: String,
    /// Directory the test command runs in; `None` means the current one.
    pub working_dir: Option<PathBuf>,
}

/// A partial configuration layer, as read from the YAML file or collected
/// from CLI flags.
///
/// ```yaml
/// commandBase: [go, test]
/// testPath: ./pkg/...
/// verbose: true
/// runPattern: TestFoo
/// skipPattern: TestBar
/// race: false
/// cover: false
/// failfast: false
/// clearScreen: true
/// color: true
/// count: 2
/// workingDir: /tmp/project
/// ```
///
/// Every key is optional; `None` leaves the underlying value untouched when
/// the layer is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawTestConfig {
    pub command_base: Option<Vec<String>>,
    pub test_path: Option<String>,
    pub verbose: Option<bool>,
    pub race: Option<bool>,
    #[serde(rename = "failfast")]
    pub fail_fast: Option<bool>,
    pub cover: Option<bool>,
    pub clear_screen: Option<bool>,
    pub color: Option<bool>,
    pub count: Option<u32>,
    pub run_pattern: Option<String>,
    pub skip_pattern: Option<String>,
    pub working_dir: Option<PathBuf>,
}

impl RawTestConfig {
    /// Overwrite every field of `config` that this layer sets.
    pub fn apply_to(&self, config: &mut TestConfig) {
        if let Some(base) = &self.command_base {
            config.command_base = base.clone();
        }
        if let Some(path) = &self.test_path {
            config.test_path = path.clone();
        }
        if let Some(v) = self.verbose {
            config.verbose = v;
        }
        if let Some(v) = self.race {
            config.race = v;
        }
        if let Some(v) = self.fail_fast {
            config.fail_fast = v;
        }
        if let Some(v) = self.cover {
            config.cover = v;
        }
        if let Some(v) = self.clear_screen {
            config.clear_screen = v;
        }
        if let Some(v) = self.color {
            config.color = v;
        }
        if let Some(n) = self.count {
            config.count = n;
        }
        if let Some(p) = &self.run_pattern {
            config.run_pattern = p.clone();
        }
        if let Some(p) = &self.skip_pattern {
            config.skip_pattern = p.clone();
        }
        if let Some(dir) = &self.working_dir {
            config.working_dir = Some(dir.clone());
        }
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            command_base: default_command_base(),
            test_path: DEFAULT_TEST_PATH.to_string(),
            verbose: false,
            race: false,
            fail_fast: false,
            cover: false,
            clear_screen: false,
            color: false,
            count: 0,
            run_pattern: String::new(),
            skip_pattern: String::new(),
            working_dir: None,
        }
    }
}

impl TestConfig {
    /// Build the full invocation as an ordered token list.
    ///
    /// Order is fixed: base tokens, path, boolean flags, count, run pattern,
    /// skip pattern.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = self.command_base.clone();
        args.push(self.test_path.clone());

        if self.verbose {
            args.push("-v".to_string());
        }
        if self.race {
            args.push("-race".to_string());
        }
        if self.fail_fast {
            args.push("-failfast".to_string());
        }
        if self.cover {
            args.push("-cover".to_string());
        }
        if self.count > 0 {
            args.push(format!("-count={}", self.count));
        }
        if !self.run_pattern.is_empty() {
            args.push(format!("-run={}", self.run_pattern));
        }
        if !self.skip_pattern.is_empty() {
            args.push(format!("-skip={}", self.skip_pattern));
        }

        args
    }

    /// Reset the run parameters touched by the `clear` command.
    ///
    /// Display options (`clear_screen`, `color`) and the working directory
    /// are left alone.
    pub fn clear_parameters(&mut self) {
        self.test_path = DEFAULT_TEST_PATH.to_string();
        self.command_base = default_command_base();
        self.verbose = false;
        self.race = false;
        self.fail_fast = false;
        self.cover = false;
        self.count = 0;
        self.run_pattern.clear();
        self.skip_pattern.clear();
    }
}

/// The configuration record shared between command handlers and the runner.
///
/// Reads (command construction) may run concurrently; writes (handlers) are
/// exclusive. A poisoned lock is recovered rather than propagated.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<TestConfig>>,
}

impl SharedConfig {
    pub fn new(config: TestConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, TestConfig> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, TestConfig> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current record.
    pub fn snapshot(&self) -> TestConfig {
        self.read().clone()
    }

    /// Token list for the current record, built under the read lock.
    pub fn build_args(&self) -> Vec<String> {
        self.read().build_args()
    }
}
