//! Unbuffered and buffered channels.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, TrySendError};
use std::thread;

use crate::errors::NoteError;

/// Outcome of [`handoff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handoff {
    /// The value the consumer received.
    pub received: i32,
    /// Whether the consumer was already taking the value when the
    /// producer's `send` returned.
    pub sent_after_take: bool,
}

/// Sends `value` from this thread to a consumer thread over a rendezvous
/// channel.
///
/// The channel has no buffer: `send` returns only once the consumer has
/// taken the value. The consumer raises a flag just before it receives, and
/// the producer reads that flag as soon as `send` returns.
pub fn handoff(value: i32) -> Result<Handoff, NoteError> {
    let (tx, rx) = mpsc::sync_channel::<i32>(0);
    let taking = AtomicBool::new(false);

    thread::scope(|s| {
        let flag = &taking;
        let consumer = s.spawn(move || {
            flag.store(true, Ordering::SeqCst);
            rx.recv().ok()
        });

        tx.send(value).map_err(|_| NoteError::Disconnected)?;
        let sent_after_take = taking.load(Ordering::SeqCst);

        let received = consumer
            .join()
            .map_err(|_| NoteError::ConsumerPanicked)?
            .ok_or(NoteError::Disconnected)?;

        Ok(Handoff {
            received,
            sent_after_take,
        })
    })
}

/// Offers `values` to a channel of `capacity` whose receiver never reads.
/// Returns how many were accepted before a send would have blocked.
pub fn fill_buffer(capacity: usize, values: &[i32]) -> Result<usize, NoteError> {
    let (tx, _rx) = mpsc::sync_channel::<i32>(capacity);

    let mut accepted = 0;
    for &value in values {
        match tx.try_send(value) {
            Ok(()) => accepted += 1,
            Err(TrySendError::Full(_)) => break,
            Err(TrySendError::Disconnected(_)) => return Err(NoteError::Disconnected),
        }
    }
    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handoff_delivers_value() {
        assert_eq!(handoff(42).unwrap().received, 42);
    }

    #[test]
    fn test_handoff_send_waits_for_consumer() {
        for value in 0..100 {
            let handoff = handoff(value).unwrap();
            assert_eq!(
                handoff,
                Handoff {
                    received: value,
                    sent_after_take: true,
                }
            );
        }
    }

    #[test]
    fn test_rendezvous_channel_holds_nothing() {
        assert_eq!(fill_buffer(0, &[42]).unwrap(), 0);
    }

    #[test]
    fn test_buffer_of_one_takes_one() {
        assert_eq!(fill_buffer(1, &[42, 100500]).unwrap(), 1);
    }

    #[test]
    fn test_buffer_larger_than_input() {
        assert_eq!(fill_buffer(8, &[1, 2, 3]).unwrap(), 3);
    }
}
