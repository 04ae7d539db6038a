//! Fixed pool of decode workers.
//!
//! - Workers pop from a shared priority queue with a bounded wait so they
//!   periodically re-check the running flag
//! - Decoding never touches GPU state; results travel back as values
//! - Completed tasks are pushed to a flume channel drained on the UI thread

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use flume::Sender;
use tracing::{debug, trace, warn};

use super::events::{self, UiEvent, UiEventDrain};
use super::queue::TaskQueue;
use super::task::{Completion, LoadTask, Priority};
use crate::decode::{Decoder, RawImage};
use crate::error::{DecodeError, PoolError};

/// How long a worker waits on an empty queue before re-checking for shutdown.
const POP_TIMEOUT: Duration = Duration::from_millis(100);

/// Interval between checks while waiting for workers to exit.
const JOIN_POLL: Duration = Duration::from_millis(5);

pub struct DecodePool<C> {
    queue: Arc<TaskQueue<C>>,
    drain: UiEventDrain<C>,
    workers: Vec<JoinHandle<()>>,
    running: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
    shutdown_timeout: Duration,
}

impl<C: 'static> DecodePool<C> {
    /// Start `workers` threads. `max_dimension` caps the larger side of every
    /// decoded image before it is handed to the UI thread.
    pub fn new(
        workers: usize,
        decoder: Arc<dyn Decoder>,
        max_dimension: u32,
        shutdown_timeout: Duration,
    ) -> Result<Self, PoolError> {
        let queue = Arc::new(TaskQueue::new());
        let (tx, drain) = events::channel();
        let running = Arc::new(AtomicBool::new(true));
        let active = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let worker = Worker {
                id: worker_id,
                queue: Arc::clone(&queue),
                tx: tx.clone(),
                decoder: Arc::clone(&decoder),
                running: Arc::clone(&running),
                active: Arc::clone(&active),
                max_dimension,
            };
            let spawned = thread::Builder::new()
                .name(format!("decode-worker-{}", worker_id))
                .spawn(move || worker.run());
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    running.store(false, Ordering::SeqCst);
                    queue.wake_all();
                    return Err(PoolError::Spawn(e));
                }
            }
        }

        debug!(workers, "Started decode worker pool");

        Ok(Self {
            queue,
            drain,
            workers: handles,
            running,
            active,
            shutdown_timeout,
        })
    }

    /// Queue a decode. Never blocks; `on_done` runs on the UI thread when the
    /// result is drained.
    pub fn submit<F>(&self, path: PathBuf, priority: Priority, resize_height: Option<u32>, on_done: F)
    where
        F: FnOnce(&mut C, Completion) -> anyhow::Result<()> + Send + 'static,
    {
        trace!(?path, ?priority, "Submitting decode");
        self.queue
            .push(LoadTask::new(path, priority, resize_height, Box::new(on_done)));
    }

    /// Raise a queued decode of `path` to `priority`. Returns false if it is
    /// not waiting in the queue.
    pub fn promote(&self, path: &Path, priority: Priority) -> bool {
        let promoted = self.queue.promote(path, priority);
        if promoted {
            trace!(?path, ?priority, "Promoted queued decode");
        }
        promoted
    }

    /// The UI-thread end of the completion queue.
    pub fn drain(&self) -> UiEventDrain<C> {
        self.drain.clone()
    }

    /// Tasks waiting for a worker.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Tasks currently being decoded.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// Stop the workers and wait for them, up to the shutdown timeout.
    /// Workers still busy after the deadline are left detached.
    pub fn shutdown(&mut self) {
        if self.workers.is_empty() && !self.running.load(Ordering::SeqCst) {
            return;
        }
        debug!("Shutting down decode pool");
        self.running.store(false, Ordering::SeqCst);
        self.queue.wake_all();

        let deadline = Instant::now() + self.shutdown_timeout;
        while Instant::now() < deadline && self.workers.iter().any(|h| !h.is_finished()) {
            thread::sleep(JOIN_POLL);
        }

        let mut stragglers = 0;
        for handle in self.workers.drain(..) {
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                stragglers += 1;
            }
        }
        if stragglers > 0 {
            warn!(stragglers, "Decode workers did not stop before the timeout");
        }
        debug!("Decode pool shutdown complete");
    }
}

impl<C> Drop for DecodePool<C> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.queue.wake_all();
    }
}

struct Worker<C> {
    id: usize,
    queue: Arc<TaskQueue<C>>,
    tx: Sender<UiEvent<C>>,
    decoder: Arc<dyn Decoder>,
    running: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
    max_dimension: u32,
}

impl<C> Worker<C> {
    fn run(self) {
        debug!(worker_id = self.id, "Decode worker started");

        while self.running.load(Ordering::Relaxed) {
            let Some(task) = self.queue.pop_timeout(POP_TIMEOUT) else {
                continue;
            };
            self.active.fetch_add(1, Ordering::Relaxed);

            let result = self.decode(&task);
            let completion = Completion {
                path: task.path,
                priority: task.priority,
                result,
                elapsed: task.submitted.elapsed(),
            };
            if let Err(e) = self.tx.send(UiEvent::new(completion, task.callback)) {
                warn!(worker_id = self.id, error = ?e, "Failed to deliver decode result");
            }

            self.active.fetch_sub(1, Ordering::Relaxed);
        }

        debug!(worker_id = self.id, "Decode worker stopped");
    }

    fn decode(&self, task: &LoadTask<C>) -> Result<RawImage, DecodeError> {
        let decoded = catch_unwind(AssertUnwindSafe(|| self.decoder.decode(&task.path)))
            .unwrap_or_else(|_| {
                Err(DecodeError::Panicked {
                    path: task.path.clone(),
                })
            });

        let mut image = match decoded {
            Ok(image) => image,
            Err(e) => {
                warn!(path = ?task.path, priority = ?task.priority, error = %e, "Decode failed");
                return Err(e);
            }
        };

        if image.clamp_to(self.max_dimension) {
            debug!(path = ?task.path, width = image.width(), height = image.height(), "Clamped oversized image");
        }
        if let Some(height) = task.resize_height {
            image.resize_to_height(height);
        }
        Ok(image)
    }
}
