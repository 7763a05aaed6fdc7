// src/input/reader.rs

//! Gated line reader.
//!
//! Reads newline-delimited commands and forwards them to the dispatcher, but
//! only while the gate is open. The dispatcher closes the gate while a test
//! run is in progress and reopens it once the run completes.
//!
//! The gate is a `watch` channel: it always holds the latest value, so the
//! dispatcher's send never blocks even when the reader is busy elsewhere.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::commands::is_help_command;
use crate::engine::{CommandRequest, HelpRequest};
use crate::input::parse::parse_command;

/// Channels the reader talks to.
#[derive(Debug)]
pub struct ReaderChannels {
    pub commands: mpsc::Sender<CommandRequest>,
    pub help: mpsc::Sender<HelpRequest>,
    /// `true` = accept input, `false` = pause.
    pub gate: watch::Receiver<bool>,
}

/// Run the read loop until end of input, cancellation, or the dispatcher
/// going away.
///
/// The gate starts closed. While closed the loop waits on the gate and makes
/// no read attempt; a gate change during a pending read abandons the read
/// (line reading is cancel-safe, so buffered input is kept) and the gate is
/// re-evaluated before reading again.
pub async fn read_commands<R>(input: R, mut channels: ReaderChannels, cancel: CancellationToken)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut open = false;

    loop {
        if !open {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("reader cancelled while gate closed");
                    return;
                }
                opened = wait_until_open(&mut channels.gate) => {
                    if !opened {
                        debug!("gate sender dropped; reader exiting");
                        return;
                    }
                    open = true;
                }
            }
        }

        // Adopt a newer gate value without blocking.
        if channels.gate.has_changed().unwrap_or(false) {
            open = *channels.gate.borrow_and_update();
            if !open {
                continue;
            }
        }

        let line = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("reader cancelled");
                return;
            }
            changed = channels.gate.changed() => {
                if changed.is_err() {
                    debug!("gate sender dropped; reader exiting");
                    return;
                }
                open = *channels.gate.borrow_and_update();
                continue;
            }
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("input stream closed; reader exiting");
                return;
            }
            Err(err) => {
                warn!(error = %err, "failed to read input");
                return;
            }
        };

        let Some(request) = parse_command(&line) else {
            continue;
        };

        let delivered = if is_help_command(&request.name) {
            send_or_cancel(&channels.help, HelpRequest, &cancel).await
        } else {
            send_or_cancel(&channels.commands, request, &cancel).await
        };

        if !delivered {
            return;
        }
    }
}

async fn wait_until_open(gate: &mut watch::Receiver<bool>) -> bool {
    gate.wait_for(|open| *open).await.is_ok()
}

/// Send `value`, giving up if cancellation wins or the receiver is gone.
async fn send_or_cancel<T>(tx: &mpsc::Sender<T>, value: T, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        res = tx.send(value) => {
            if res.is_err() {
                debug!("dispatcher channel closed; reader exiting");
            }
            res.is_ok()
        }
    }
}
