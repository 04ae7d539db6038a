//! Thread-safe priority queue feeding the decode workers.

use std::collections::BinaryHeap;
use std::path::Path;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use super::task::{LoadTask, Priority};

struct Inner<C> {
    heap: BinaryHeap<LoadTask<C>>,
    next_seq: u64,
}

pub struct TaskQueue<C> {
    inner: Mutex<Inner<C>>,
    available: Condvar,
}

impl<C> TaskQueue<C> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                heap: BinaryHeap::new(),
                next_seq: 0,
            }),
            available: Condvar::new(),
        }
    }

    /// Enqueue a task, stamping its FIFO sequence number.
    pub fn push(&self, mut task: LoadTask<C>) {
        let mut inner = self.inner.lock();
        task.seq = inner.next_seq;
        inner.next_seq += 1;
        inner.heap.push(task);
        drop(inner);
        self.available.notify_one();
    }

    /// Pop the most urgent task, waiting at most `timeout` for one to arrive.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<LoadTask<C>> {
        let mut inner = self.inner.lock();
        if inner.heap.is_empty() {
            self.available.wait_for(&mut inner, timeout);
        }
        inner.heap.pop()
    }

    /// Raise queued tasks for `path` to `priority` if they are less urgent.
    /// Returns false when no such task is waiting (already picked up or never
    /// queued).
    pub fn promote(&self, path: &Path, priority: Priority) -> bool {
        let mut inner = self.inner.lock();
        let mut tasks = std::mem::take(&mut inner.heap).into_vec();
        let mut promoted = false;
        for task in tasks.iter_mut() {
            if task.path == path && task.priority > priority {
                task.priority = priority;
                promoted = true;
            }
        }
        inner.heap = BinaryHeap::from(tasks);
        promoted
    }

    /// Pop without waiting.
    pub fn try_pop(&self) -> Option<LoadTask<C>> {
        self.inner.lock().heap.pop()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wake every waiting worker so it can re-check its running flag.
    pub fn wake_all(&self) {
        self.available.notify_all();
    }
}

impl<C> Default for TaskQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::task::callback;
    use std::path::PathBuf;
    use std::time::Instant;

    fn task(name: &str, priority: Priority) -> LoadTask<()> {
        LoadTask::new(PathBuf::from(name), priority, None, callback(|_, _| Ok(())))
    }

    #[test]
    fn test_priority_class_wins() {
        let queue = TaskQueue::new();
        queue.push(task("gallery", Priority::Gallery));
        queue.push(task("neighbor", Priority::Neighbor));
        queue.push(task("current", Priority::Current));

        let order: Vec<_> = std::iter::from_fn(|| queue.try_pop())
            .map(|t| t.path)
            .collect();
        assert_eq!(
            order,
            vec![
                PathBuf::from("current"),
                PathBuf::from("neighbor"),
                PathBuf::from("gallery")
            ]
        );
    }

    #[test]
    fn test_fifo_within_class() {
        let queue = TaskQueue::new();
        for name in ["a", "b", "c"] {
            queue.push(task(name, Priority::Neighbor));
        }
        queue.push(task("urgent", Priority::Current));

        let order: Vec<_> = std::iter::from_fn(|| queue.try_pop())
            .map(|t| t.path.to_string_lossy().into_owned())
            .collect();
        assert_eq!(order, vec!["urgent", "a", "b", "c"]);
    }

    #[test]
    fn test_promote_moves_task_ahead_of_its_class() {
        let queue = TaskQueue::new();
        for name in ["a", "b", "c"] {
            queue.push(task(name, Priority::Neighbor));
        }
        queue.push(task("thumb", Priority::Gallery));

        assert!(queue.promote(Path::new("c"), Priority::Current));
        // Never demotes, and unknown paths are reported.
        assert!(!queue.promote(Path::new("c"), Priority::Gallery));
        assert!(!queue.promote(Path::new("missing"), Priority::Current));

        let popped: Vec<_> = std::iter::from_fn(|| queue.try_pop())
            .map(|t| (t.path.to_string_lossy().into_owned(), t.priority))
            .collect();
        assert_eq!(
            popped,
            vec![
                ("c".to_string(), Priority::Current),
                ("a".to_string(), Priority::Neighbor),
                ("b".to_string(), Priority::Neighbor),
                ("thumb".to_string(), Priority::Gallery),
            ]
        );
    }

    #[test]
    fn test_pop_timeout_on_empty_queue() {
        let queue: TaskQueue<()> = TaskQueue::new();
        let start = Instant::now();
        assert!(queue.pop_timeout(Duration::from_millis(20)).is_none());
        assert!(start.elapsed() >= Duration::from_millis(10));
        assert!(queue.is_empty());
    }
}
