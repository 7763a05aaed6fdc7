// src/exec/runner.rs

//! Single test-run execution.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::SharedConfig;
use crate::display::CLEAR_SCREEN;
use crate::engine::RunComplete;
use crate::exec::colorize::colorize;
use crate::exec::command::TestInvocation;

/// How long to keep draining output after the process was killed.
///
/// Grandchildren (e.g. compiled test binaries) may still hold the pipes.
const DRAIN_AFTER_KILL: Duration = Duration::from_secs(1);

/// Destination for one of the process's output streams.
pub type OutputSink = Box<dyn AsyncWrite + Send + Unpin>;

/// Where a run writes the command line and the process output.
pub struct RunnerSinks {
    /// Receives the command line, the clear-screen sequence and stdout.
    pub stdout: OutputSink,
    pub stderr: OutputSink,
}

impl Default for RunnerSinks {
    fn default() -> Self {
        Self {
            stdout: Box::new(tokio::io::stdout()),
            stderr: Box::new(tokio::io::stderr()),
        }
    }
}

impl std::fmt::Debug for RunnerSinks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunnerSinks").finish_non_exhaustive()
    }
}

/// Runs the configured test command once.
#[derive(Debug)]
pub struct Runner {
    config: SharedConfig,
    sinks: RunnerSinks,
}

impl Runner {
    /// A runner writing to the process's own stdout/stderr.
    pub fn new(config: SharedConfig) -> Self {
        Self::with_sinks(config, RunnerSinks::default())
    }

    pub fn with_sinks(config: SharedConfig, sinks: RunnerSinks) -> Self {
        Self { config, sinks }
    }

    /// Execute the test command and then send exactly one [`RunComplete`].
    ///
    /// Every failure (empty command, spawn error, non-zero exit, stream
    /// error) is logged; none of them suppresses the completion signal.
    /// Cancelling `cancel` kills the process, and completion is still sent.
    pub async fn run(mut self, cancel: CancellationToken, complete_tx: mpsc::Sender<RunComplete>) {
        if let Err(err) = self.run_inner(&cancel).await {
            error!(error = %err, "test run failed");
        }

        if complete_tx.send(RunComplete).await.is_err() {
            debug!("completion receiver dropped; run completion not delivered");
        }
    }

    async fn run_inner(&mut self, cancel: &CancellationToken) -> Result<()> {
        let invocation = TestInvocation::from_config(&self.config);
        let command_line = invocation.command_line();

        if invocation.clear_screen {
            self.sinks.stdout.write_all(CLEAR_SCREEN.as_bytes()).await?;
        }
        self.sinks
            .stdout
            .write_all(format!("{command_line}\n").as_bytes())
            .await?;
        self.sinks.stdout.flush().await?;

        info!(cmd = %command_line, "starting test process");

        let mut cmd = invocation.to_command()?;
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning test process `{command_line}`"))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let color = invocation.color;

        let RunnerSinks {
            stdout: out_sink,
            stderr: err_sink,
        } = &mut self.sinks;

        let drains = async {
            tokio::join!(
                stream_output(stdout, out_sink, color, "stdout"),
                stream_output(stderr, err_sink, color, "stderr"),
            )
        };
        tokio::pin!(drains);

        let mut killed = false;
        tokio::select! {
            _ = &mut drains => {}
            _ = cancel.cancelled() => {
                kill(&mut child).await;
                killed = true;
                if tokio::time::timeout(DRAIN_AFTER_KILL, &mut drains).await.is_err() {
                    warn!("test output still open after kill; abandoning drain");
                }
            }
        }

        let waited = tokio::select! {
            status = child.wait() => status,
            _ = cancel.cancelled(), if !killed => {
                kill(&mut child).await;
                child.wait().await
            }
        };
        let status = waited.context("waiting for test process")?;

        let code = status.code().unwrap_or(-1);
        if status.success() {
            info!(exit_code = code, "test process exited");
        } else {
            info!(exit_code = code, success = false, "test process exited with failure");
        }

        Ok(())
    }
}

async fn kill(child: &mut Child) {
    info!("cancellation requested; killing test process");
    if let Err(err) = child.start_kill() {
        warn!(error = %err, "failed to kill test process");
    }
}

/// Copy `pipe` to `sink` line by line until EOF.
///
/// Invalid UTF-8 is replaced rather than treated as an error so the pipe is
/// always drained to the end. Write failures are logged and draining goes on.
async fn stream_output<R, W>(pipe: Option<R>, sink: &mut W, color: bool, stream: &'static str)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + ?Sized,
{
    let Some(pipe) = pipe else {
        return;
    };

    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let raw = String::from_utf8_lossy(&buf);
                let line = raw.trim_end_matches(['\n', '\r']);
                let text = if color { colorize(line) } else { line.to_string() };
                if let Err(err) = write_line(sink, &text).await {
                    warn!(stream, error = %err, "failed to write test output");
                }
            }
            Err(err) => {
                warn!(stream, error = %err, "failed to read test output");
                break;
            }
        }
    }

    if let Err(err) = sink.flush().await {
        debug!(stream, error = %err, "failed to flush test output");
    }
}

async fn write_line<W>(sink: &mut W, text: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    sink.write_all(text.as_bytes()).await?;
    sink.write_all(b"\n").await?;
    sink.flush().await
}
