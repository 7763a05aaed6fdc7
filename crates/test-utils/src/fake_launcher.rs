use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use gotest_watch::engine::{RunComplete, RunTrigger};
use gotest_watch::exec::RunLauncher;

/// Shared record of the runs a [`FakeLauncher`] was asked to start.
#[derive(Debug, Clone, Default)]
pub struct LaunchLog {
    triggers: Arc<Mutex<Vec<RunTrigger>>>,
}

impl LaunchLog {
    pub fn triggers(&self) -> Vec<RunTrigger> {
        self.triggers.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.triggers.lock().unwrap().len()
    }

    fn push(&self, trigger: RunTrigger) {
        self.triggers.lock().unwrap().push(trigger);
    }
}

/// A fake launcher that:
/// - records which runs were started
/// - either never completes them (the test sends `RunComplete` itself), or
///   immediately reports `RunComplete` for each launch.
#[derive(Debug)]
pub struct FakeLauncher {
    log: LaunchLog,
    complete_tx: Option<mpsc::Sender<RunComplete>>,
}

impl FakeLauncher {
    /// Records launches; completion is up to the test.
    pub fn manual() -> Self {
        Self {
            log: LaunchLog::default(),
            complete_tx: None,
        }
    }

    /// Records launches and completes each one right away.
    pub fn completing(complete_tx: mpsc::Sender<RunComplete>) -> Self {
        Self {
            log: LaunchLog::default(),
            complete_tx: Some(complete_tx),
        }
    }

    pub fn log(&self) -> LaunchLog {
        self.log.clone()
    }
}

impl RunLauncher for FakeLauncher {
    fn launch(&mut self, trigger: RunTrigger) {
        self.log.push(trigger);
        if let Some(tx) = &self.complete_tx {
            let tx = tx.clone();
            tokio::spawn(async move {
                let _ = tx.send(RunComplete).await;
            });
        }
    }
}
