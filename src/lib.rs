// src/lib.rs

pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod input;
pub mod logging;
pub mod watch;

use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::commands::CommandRegistry;
use crate::config::{load_from_path, load_or_default, merge_layers, SharedConfig};
use crate::engine::runtime::SHUTDOWN_NOTICE;
use crate::engine::{
    Dispatcher, DispatcherChannels, RunComplete, ShutdownOutcome, SHUTDOWN_TIMEOUT,
};
use crate::exec::{Runner, TestRunLauncher};
use crate::input::{read_commands, ReaderChannels};
use crate::watch::FileWatcher;

/// Capacity of every producer -> dispatcher channel.
pub const CHANNEL_CAPACITY: usize = 10;

/// Printed before the startup run.
pub const STARTUP_NOTICE: &str = "Running tests...";

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file layer, then CLI layer)
/// - signal handling
/// - the file watcher (registered now, started after the first run)
/// - the stdin reader
/// - the startup test run
/// - the dispatcher loop
pub async fn run(args: CliArgs) -> Result<ShutdownOutcome> {
    let cwd = std::env::current_dir().context("reading current working directory")?;

    let file_layer = match &args.config {
        Some(path) => load_from_path(path)
            .with_context(|| format!("loading config file {}", path.display()))?,
        None => load_or_default(&cwd),
    };
    let config = merge_layers([&file_layer, &args.config_layer()])?;
    debug!(?config, "effective configuration");
    let config = SharedConfig::new(config);

    let registry = CommandRegistry::with_defaults();
    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone());

    let (file_tx, file_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (command_tx, command_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (help_tx, help_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (complete_tx, mut complete_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (gate_tx, gate_rx) = tokio::sync::watch::channel(false);
    let (start_tx, start_rx) = oneshot::channel();

    // Registration happens here so watcher failures abort startup.
    let watcher = FileWatcher::new(&cwd)?;
    tokio::spawn(watcher.run(start_rx, file_tx, cancel.clone()));

    tokio::spawn(read_commands(
        BufReader::new(tokio::io::stdin()),
        ReaderChannels {
            commands: command_tx,
            help: help_tx,
            gate: gate_rx,
        },
        cancel.clone(),
    ));

    println!("{STARTUP_NOTICE}");
    tokio::spawn(Runner::new(config.clone()).run(cancel.clone(), complete_tx.clone()));

    tokio::select! {
        _ = complete_rx.recv() => {}
        _ = cancel.cancelled() => return Ok(finish_startup_run(&mut complete_rx).await),
    }

    if start_tx.send(()).is_err() {
        warn!("file watcher exited before start");
    }

    let launcher = TestRunLauncher::new(config.clone(), complete_tx, cancel.clone());
    let channels = DispatcherChannels {
        file_rx,
        command_rx,
        help_rx,
        complete_rx,
        gate_tx,
    };

    Dispatcher::new(config, registry, channels, launcher, cancel)
        .run()
        .await
        .map_err(Into::into)
}

/// Shutdown requested while the startup run is still going.
async fn finish_startup_run(complete_rx: &mut mpsc::Receiver<RunComplete>) -> ShutdownOutcome {
    let outcome = match tokio::time::timeout(SHUTDOWN_TIMEOUT, complete_rx.recv()).await {
        Ok(_) => ShutdownOutcome::Clean,
        Err(_) => {
            eprintln!(
                "Test run did not finish within {}s; exiting anyway",
                SHUTDOWN_TIMEOUT.as_secs_f64()
            );
            ShutdownOutcome::TimedOut
        }
    };
    println!("{SHUTDOWN_NOTICE}");
    let _ = std::io::stdout().flush();
    outcome
}

/// Ctrl-C (and SIGTERM on unix) cancel the shared token.
fn spawn_signal_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("shutdown signal received");
        cancel.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(err) => {
            warn!(error = %err, "failed to listen for SIGTERM");
            ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = ctrl_c() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
