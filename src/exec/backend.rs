// src/exec/backend.rs

//! Pluggable run launcher abstraction.
//!
//! The dispatcher asks a `RunLauncher` to start a test run instead of
//! spawning processes itself. Production uses [`TestRunLauncher`], which
//! spawns a [`Runner`] on the tokio runtime; tests substitute a fake that
//! records launches and decides when (or whether) to report completion.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::SharedConfig;
use crate::engine::{RunComplete, RunTrigger};

use super::runner::Runner;

/// Starts test runs on behalf of the dispatcher.
///
/// An implementation must eventually deliver exactly one [`RunComplete`] per
/// launch on the completion channel it was built with. Launching must not
/// block: the dispatcher keeps handling messages while the run is going.
pub trait RunLauncher: Send {
    fn launch(&mut self, trigger: RunTrigger);
}

/// Launcher used in production: one tokio task per run.
#[derive(Debug, Clone)]
pub struct TestRunLauncher {
    config: SharedConfig,
    complete_tx: mpsc::Sender<RunComplete>,
    cancel: CancellationToken,
}

impl TestRunLauncher {
    pub fn new(
        config: SharedConfig,
        complete_tx: mpsc::Sender<RunComplete>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            complete_tx,
            cancel,
        }
    }
}

impl RunLauncher for TestRunLauncher {
    fn launch(&mut self, trigger: RunTrigger) {
        debug!(?trigger, "launching test run");
        let runner = Runner::new(self.config.clone());
        tokio::spawn(runner.run(self.cancel.clone(), self.complete_tx.clone()));
    }
}
