//! A single `select` between receiving and sending.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// A value was read from the inbox.
    Received(i32),
    /// The value was written to the outbox.
    Sent,
    /// Neither side was ready.
    WouldBlock,
    /// Both channels are closed.
    Closed,
}

/// Either reads one value from `inbox` or writes `value` to `outbox`,
/// whichever is ready. When both are, the choice is random. When neither
/// is, returns [`SelectOutcome::WouldBlock`] instead of waiting.
pub async fn select_once(
    inbox: &mut mpsc::Receiver<i32>,
    outbox: &mpsc::Sender<i32>,
    value: i32,
) -> SelectOutcome {
    let choice = async {
        tokio::select! {
            Some(received) = inbox.recv() => SelectOutcome::Received(received),
            Ok(()) = outbox.send(value) => SelectOutcome::Sent,
            else => SelectOutcome::Closed,
        }
    };

    // A zero timeout still polls the select once before giving up
    timeout(Duration::ZERO, choice)
        .await
        .unwrap_or(SelectOutcome::WouldBlock)
}
