use std::collections::VecDeque;
use std::time::Duration;

use tracing::debug;

use super::tween::Direction;

/// A switch requested while another one was still animating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchRequest {
    pub direction: Direction,
    pub duration: Duration,
}

/// Bounded FIFO of pending switches. When full, the oldest request is dropped.
#[derive(Debug)]
pub struct SwitchQueue {
    items: VecDeque<SwitchRequest>,
    limit: usize,
}

impl SwitchQueue {
    pub fn new(limit: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(limit),
            limit: limit.max(1),
        }
    }

    /// Append a request. Returns the request dropped to make room, if any.
    pub fn push(&mut self, request: SwitchRequest) -> Option<SwitchRequest> {
        let dropped = if self.items.len() >= self.limit {
            self.items.pop_front()
        } else {
            None
        };
        if dropped.is_some() {
            debug!(limit = self.limit, "Switch queue full, dropping oldest request");
        }
        self.items.push_back(request);
        dropped
    }

    pub fn pop(&mut self) -> Option<SwitchRequest> {
        self.items.pop_front()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SwitchRequest> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(ms: u64) -> SwitchRequest {
        SwitchRequest {
            direction: Direction::Next,
            duration: Duration::from_millis(ms),
        }
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut queue = SwitchQueue::new(20);
        let mut dropped = Vec::new();
        for i in 0..25 {
            if let Some(old) = queue.push(req(i)) {
                dropped.push(old.duration.as_millis() as u64);
            }
        }
        assert_eq!(queue.len(), 20);
        assert_eq!(dropped, vec![0, 1, 2, 3, 4]);
        assert_eq!(queue.iter().next(), Some(&req(5)));
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = SwitchQueue::new(20);
        queue.push(req(1));
        queue.push(req(2));
        assert_eq!(queue.pop(), Some(req(1)));
        assert_eq!(queue.pop(), Some(req(2)));
        assert_eq!(queue.pop(), None);
    }
}
