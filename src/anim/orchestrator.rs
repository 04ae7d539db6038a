//! Holds at most one animation of each kind and reports which ones finished.
//!
//! The orchestrator only tracks time. What a finished animation means for the
//! viewer (committing views, freeing snapshots, draining the switch queue) is
//! handled by the caller.

use std::time::Instant;

use tracing::trace;

use super::switch_queue::{SwitchQueue, SwitchRequest};
use super::tween::{OpenAnim, SwitchAnim, ToggleZoomAnim, ZoomAnim};

/// An animation that reached the end of its tween on this update.
#[derive(Debug)]
pub enum Finished {
    Open(OpenAnim),
    Switch(SwitchAnim),
    Zoom(ZoomAnim),
    ToggleZoom(ToggleZoomAnim),
}

#[derive(Debug)]
pub struct Orchestrator {
    pub open: Option<OpenAnim>,
    pub switch: Option<SwitchAnim>,
    pub zoom: Option<ZoomAnim>,
    pub toggle: Option<ToggleZoomAnim>,
    queue: SwitchQueue,
}

impl Orchestrator {
    pub fn new(switch_queue_limit: usize) -> Self {
        Self {
            open: None,
            switch: None,
            zoom: None,
            toggle: None,
            queue: SwitchQueue::new(switch_queue_limit),
        }
    }

    pub fn is_opening(&self) -> bool {
        self.open.is_some()
    }

    pub fn is_switching(&self) -> bool {
        self.switch.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.open.is_some() || self.switch.is_some() || self.zoom.is_some() || self.toggle.is_some()
    }

    /// Cancel view tweens that would fight over the current view.
    pub fn cancel_view_tweens(&mut self) {
        self.zoom = None;
        self.toggle = None;
    }

    pub fn queue_switch(&mut self, request: SwitchRequest) -> Option<SwitchRequest> {
        self.queue.push(request)
    }

    pub fn next_queued_switch(&mut self) -> Option<SwitchRequest> {
        self.queue.pop()
    }

    pub fn clear_switch_queue(&mut self) {
        self.queue.clear();
    }

    pub fn queued_switches(&self) -> usize {
        self.queue.len()
    }

    /// Remove every animation whose tween is complete at `now`.
    pub fn update(&mut self, now: Instant) -> Vec<Finished> {
        let mut finished = Vec::new();

        if self.open.as_ref().is_some_and(|a| a.tween.is_done(now)) {
            if let Some(anim) = self.open.take() {
                trace!("Open animation finished");
                finished.push(Finished::Open(anim));
            }
        }
        if self.zoom.as_ref().is_some_and(|a| a.tween.is_done(now)) {
            if let Some(anim) = self.zoom.take() {
                trace!("Zoom animation finished");
                finished.push(Finished::Zoom(anim));
            }
        }
        if self.toggle.as_ref().is_some_and(|a| a.tween.is_done(now)) {
            if let Some(anim) = self.toggle.take() {
                trace!(mode = ?anim.target_mode, "Toggle zoom animation finished");
                finished.push(Finished::ToggleZoom(anim));
            }
        }
        if self.switch.as_ref().is_some_and(|a| a.is_done(now)) {
            if let Some(anim) = self.switch.take() {
                trace!(target = anim.target, "Switch animation finished");
                finished.push(Finished::Switch(anim));
            }
        }

        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::tween::{Direction, Tween};
    use crate::view::{ViewTransform, ZoomMode};
    use std::time::Duration;

    #[test]
    fn test_update_reports_each_finished_kind() {
        let t0 = Instant::now();
        let mut orch = Orchestrator::new(20);
        let view = ViewTransform::default();

        orch.zoom = Some(ZoomAnim {
            tween: Tween::new(t0, Duration::from_millis(100)),
            from: view,
            to: view,
        });
        orch.toggle = Some(ToggleZoomAnim {
            tween: Tween::new(t0, Duration::from_millis(150)),
            from: view,
            to: view,
            target_mode: ZoomMode::OneToOne,
        });
        let mut switch = SwitchAnim::new(1, Direction::Next, Duration::from_millis(200), None, view);
        orch.switch = Some(switch.clone());
        assert!(orch.is_animating());

        let done = orch.update(t0 + Duration::from_millis(120));
        assert!(matches!(done.as_slice(), [Finished::Zoom(_)]));

        // A switch waiting for its decode never finishes on time alone.
        let done = orch.update(t0 + Duration::from_secs(10));
        assert!(matches!(done.as_slice(), [Finished::ToggleZoom(_)]));
        assert!(orch.is_switching());

        switch.mark_loaded(t0);
        orch.switch = Some(switch);
        let done = orch.update(t0 + Duration::from_millis(250));
        assert!(matches!(done.as_slice(), [Finished::Switch(_)]));
        assert!(!orch.is_animating());
    }
}
