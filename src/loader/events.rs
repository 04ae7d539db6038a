//! Completed decodes waiting to be handled on the UI thread.
//!
//! Workers push into an unbounded flume channel; the UI thread drains a
//! bounded number per frame so bursts of GPU uploads are spread out.

use flume::{Receiver, Sender};
use tracing::{trace, warn};

use super::task::{Callback, Completion};

/// A finished decode paired with its continuation.
pub struct UiEvent<C> {
    pub completion: Completion,
    pub(crate) callback: Callback<C>,
}

impl<C> UiEvent<C> {
    pub fn new(completion: Completion, callback: Callback<C>) -> Self {
        Self {
            completion,
            callback,
        }
    }
}

/// Create the worker-side sender and the UI-side drain.
pub fn channel<C>() -> (Sender<UiEvent<C>>, UiEventDrain<C>) {
    let (tx, rx) = flume::unbounded();
    (tx, UiEventDrain { rx })
}

/// UI-thread end of the completion queue.
pub struct UiEventDrain<C> {
    rx: Receiver<UiEvent<C>>,
}

impl<C> Clone for UiEventDrain<C> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<C> UiEventDrain<C> {
    /// Take up to `max_events` queued events without running them.
    pub fn take(&self, max_events: usize) -> Vec<UiEvent<C>> {
        let mut events = Vec::with_capacity(max_events.min(self.rx.len()));
        while events.len() < max_events {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(_) => break,
            }
        }
        events
    }

    /// Pop up to `max_events` events, then run each callback against `ctx`.
    ///
    /// A callback returning an error is logged and does not stop the rest.
    /// Returns the number of events handled.
    pub fn poll(&self, ctx: &mut C, max_events: usize) -> usize {
        let events = self.take(max_events);
        let count = events.len();
        for event in events {
            let path = event.completion.path.clone();
            if let Err(e) = (event.callback)(ctx, event.completion) {
                warn!(?path, error = ?e, "Load callback failed");
            }
        }
        if count > 0 {
            trace!(count, remaining = self.rx.len(), "Drained UI events");
        }
        count
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::RawImage;
    use crate::loader::task::{callback, Priority};
    use std::path::PathBuf;
    use std::time::Duration;

    fn completion(name: &str) -> Completion {
        Completion {
            path: PathBuf::from(name),
            priority: Priority::Current,
            result: Ok(RawImage::placeholder()),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_poll_respects_budget_and_order() {
        let (tx, drain) = channel::<Vec<String>>();
        for name in ["a", "b", "c"] {
            let cb = callback(|seen: &mut Vec<String>, c: Completion| {
                seen.push(c.path.to_string_lossy().into_owned());
                Ok(())
            });
            tx.send(UiEvent::new(completion(name), cb)).unwrap();
        }

        let mut seen = Vec::new();
        assert_eq!(drain.poll(&mut seen, 2), 2);
        assert_eq!(seen, vec!["a", "b"]);
        assert_eq!(drain.len(), 1);

        assert_eq!(drain.poll(&mut seen, 10), 1);
        assert_eq!(seen, vec!["a", "b", "c"]);
        assert!(drain.is_empty());
    }

    #[test]
    fn test_failing_callback_does_not_block_others() {
        let (tx, drain) = channel::<u32>();
        tx.send(UiEvent::new(
            completion("bad"),
            callback(|_: &mut u32, _| anyhow::bail!("upload exploded")),
        ))
        .unwrap();
        tx.send(UiEvent::new(
            completion("good"),
            callback(|count: &mut u32, _| {
                *count += 1;
                Ok(())
            }),
        ))
        .unwrap();

        let mut count = 0;
        assert_eq!(drain.poll(&mut count, 8), 2);
        assert_eq!(count, 1);
    }
}
