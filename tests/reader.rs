// tests/reader.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use gotest_watch::engine::{CommandRequest, HelpRequest};
use gotest_watch::input::{parse_command, read_commands, ReaderChannels};

struct ReaderHarness {
    commands: mpsc::Receiver<CommandRequest>,
    help: mpsc::Receiver<HelpRequest>,
    gate: watch::Sender<bool>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ReaderHarness {
    fn spawn<R>(input: R, gate_open: bool) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        Self::spawn_with_capacity(input, gate_open, 10)
    }

    fn spawn_with_capacity<R>(input: R, gate_open: bool, capacity: usize) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (command_tx, commands) = mpsc::channel(capacity);
        let (help_tx, help) = mpsc::channel(10);
        let (gate, gate_rx) = watch::channel(gate_open);
        let cancel = CancellationToken::new();

        let channels = ReaderChannels {
            commands: command_tx,
            help: help_tx,
            gate: gate_rx,
        };
        let handle = tokio::spawn(read_commands(input, channels, cancel.clone()));

        Self {
            commands,
            help,
            gate,
            cancel,
            handle,
        }
    }

    async fn next_command(&mut self) -> CommandRequest {
        with_timeout(self.commands.recv()).await.expect("command")
    }

    async fn nothing_for(&mut self, wait: Duration) -> bool {
        tokio::time::sleep(wait).await;
        self.commands.try_recv().is_err() && self.help.try_recv().is_err()
    }
}

fn req(name: &str, args: &[&str]) -> CommandRequest {
    CommandRequest::new(name, args.iter().map(|a| a.to_string()).collect())
}

#[test]
fn parse_splits_name_and_args() {
    assert_eq!(parse_command("r Foo"), Some(req("r", &["Foo"])));
    assert_eq!(
        parse_command("  cmd   go  test \t-tags=x "),
        Some(req("cmd", &["go", "test", "-tags=x"]))
    );
    assert_eq!(parse_command("v"), Some(req("v", &[])));
    assert_eq!(parse_command(""), None);
    assert_eq!(parse_command("   \t "), None);
}

#[tokio::test]
async fn routes_help_and_commands_and_skips_blank_lines() {
    init_tracing();
    let input: &'static [u8] = b"h\nr Foo\n\n   \nhelp\ncount 3\n";
    let mut h = ReaderHarness::spawn(input, true);

    assert_eq!(h.next_command().await, req("r", &["Foo"]));
    assert_eq!(h.next_command().await, req("count", &["3"]));
    with_timeout(&mut h.handle).await.unwrap();

    let mut helps = 0;
    while h.help.try_recv().is_ok() {
        helps += 1;
    }
    assert_eq!(helps, 2);
    assert!(h.commands.try_recv().is_err());
}

#[tokio::test]
async fn closed_gate_blocks_reading_until_opened() {
    init_tracing();
    let input: &'static [u8] = b"v\n";
    let mut h = ReaderHarness::spawn(input, false);

    assert!(h.nothing_for(Duration::from_millis(100)).await);
    assert!(!h.handle.is_finished(), "reader hit EOF while gate closed");

    h.gate.send(true).unwrap();
    assert_eq!(h.next_command().await, req("v", &[]));
}

#[tokio::test]
async fn gate_closing_during_pending_read_holds_next_line() {
    init_tracing();
    let (mut writer, reader) = tokio::io::duplex(64);
    let mut h = ReaderHarness::spawn(BufReader::new(reader), true);

    writer.write_all(b"a\n").await.unwrap();
    assert_eq!(h.next_command().await, req("a", &[]));

    h.gate.send(false).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    writer.write_all(b"b\n").await.unwrap();
    assert!(h.nothing_for(Duration::from_millis(100)).await);

    h.gate.send(true).unwrap();
    assert_eq!(h.next_command().await, req("b", &[]));
}

#[tokio::test]
async fn partial_line_survives_gate_toggle() {
    init_tracing();
    let (mut writer, reader) = tokio::io::duplex(64);
    let mut h = ReaderHarness::spawn(BufReader::new(reader), true);

    writer.write_all(b"r Fo").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    h.gate.send(false).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    h.gate.send(true).unwrap();
    writer.write_all(b"o\n").await.unwrap();

    assert_eq!(h.next_command().await, req("r", &["Foo"]));
}

#[tokio::test]
async fn cancellation_stops_pending_read() {
    init_tracing();
    let (_writer, reader) = tokio::io::duplex(64);
    let h = ReaderHarness::spawn(BufReader::new(reader), true);

    tokio::time::sleep(Duration::from_millis(20)).await;
    h.cancel.cancel();
    with_timeout(h.handle).await.unwrap();
}

#[tokio::test]
async fn cancellation_stops_closed_gate_wait() {
    init_tracing();
    let (_writer, reader) = tokio::io::duplex(64);
    let h = ReaderHarness::spawn(BufReader::new(reader), false);

    h.cancel.cancel();
    with_timeout(h.handle).await.unwrap();
}

#[tokio::test]
async fn exits_when_dispatcher_is_gone() {
    init_tracing();
    let input: &'static [u8] = b"v\nv\nv\n";
    let h = ReaderHarness::spawn(input, true);
    let ReaderHarness {
        commands, handle, ..
    } = h;
    drop(commands);

    with_timeout(handle).await.unwrap();
}

#[tokio::test]
async fn cancellation_stops_send_into_full_channel() {
    init_tracing();
    let input: &'static [u8] = b"v\nr Foo\ncount 2\n";
    let h = ReaderHarness::spawn_with_capacity(input, true, 1);

    // One line fills the channel; the reader then blocks sending the next.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!h.handle.is_finished());

    h.cancel.cancel();
    with_timeout(h.handle).await.unwrap();
}
