//! Time-based tweens and the four animation kinds built on them.

use std::time::{Duration, Instant};

use super::easing::{ease_in_out_cubic, ease_out_quad, lerp};
use crate::gpu::TextureHandle;
use crate::view::{lerp_view, ViewTransform, ZoomMode};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub start: Instant,
    pub duration: Duration,
}

impl Tween {
    pub fn new(start: Instant, duration: Duration) -> Self {
        Self { start, duration }
    }

    /// Linear progress in `[0, 1]`. A zero duration is complete immediately.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn is_done(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

/// Fade and grow from a reduced view into the resting fit view.
#[derive(Debug, Clone)]
pub struct OpenAnim {
    pub tween: Tween,
    pub from: ViewTransform,
    pub to: ViewTransform,
    pub alpha_start: f64,
    pub background_target: f64,
}

/// One sampled step of the open animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenSample {
    pub view: ViewTransform,
    pub alpha: f64,
    pub background: f64,
}

impl OpenAnim {
    pub fn sample(&self, now: Instant) -> OpenSample {
        let e = ease_out_quad(self.tween.progress(now));
        OpenSample {
            view: lerp_view(&self.from, &self.to, e),
            alpha: lerp(self.alpha_start, 1.0, e),
            background: lerp(0.0, self.background_target, e),
        }
    }
}

/// Which way a switch moves through the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Prev => -1.0,
            Direction::Next => 1.0,
        }
    }

    /// Direction of travel from `from` to `to`.
    pub fn between(from: usize, to: usize) -> Self {
        if to < from {
            Direction::Prev
        } else {
            Direction::Next
        }
    }

    /// Neighbor of `index` in this direction, if it is inside `0..len`.
    pub fn step(self, index: usize, len: usize) -> Option<usize> {
        match self {
            Direction::Prev => index.checked_sub(1),
            Direction::Next => index.checked_add(1).filter(|&i| i < len),
        }
    }
}

/// Progress of a switch. There is no settled variant: a switch is settled
/// once [`Orchestrator::update`](super::Orchestrator::update) removes it and
/// hands it back as `Finished::Switch`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwitchPhase {
    /// Waiting for the target's CURRENT decode.
    Requested,
    /// Target is on the GPU; the slide is running.
    Loaded { tween: Tween },
}

/// Slide from the previous image to the next one.
///
/// The snapshot is the previous image's texture, owned by the animation until
/// it settles. It is not destroyed while the slide runs.
#[derive(Debug, Clone)]
pub struct SwitchAnim {
    pub target: usize,
    pub direction: Direction,
    pub duration: Duration,
    pub snapshot: Option<TextureHandle>,
    pub prev_view: ViewTransform,
    pub phase: SwitchPhase,
}

/// Both layers of a sampled slide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchSample {
    pub prev_view: ViewTransform,
    pub prev_alpha: f64,
    pub curr_view: ViewTransform,
    pub curr_alpha: f64,
}

impl SwitchAnim {
    pub fn new(
        target: usize,
        direction: Direction,
        duration: Duration,
        snapshot: Option<TextureHandle>,
        prev_view: ViewTransform,
    ) -> Self {
        Self {
            target,
            direction,
            duration,
            snapshot,
            prev_view,
            phase: SwitchPhase::Requested,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.phase, SwitchPhase::Loaded { .. })
    }

    /// Start the slide. Does nothing once already loaded.
    pub fn mark_loaded(&mut self, now: Instant) {
        if !self.is_loaded() {
            self.phase = SwitchPhase::Loaded {
                tween: Tween::new(now, self.duration),
            };
        }
    }

    pub fn progress(&self, now: Instant) -> f64 {
        match self.phase {
            SwitchPhase::Requested => 0.0,
            SwitchPhase::Loaded { tween } => tween.progress(now),
        }
    }

    pub fn is_done(&self, now: Instant) -> bool {
        match self.phase {
            SwitchPhase::Requested => false,
            SwitchPhase::Loaded { tween } => tween.is_done(now),
        }
    }

    /// Previous image exits toward `-direction * screen_w` while fading out;
    /// the new one enters from the opposite edge while fading in.
    pub fn sample(&self, now: Instant, curr_view: &ViewTransform, screen_w: f64) -> SwitchSample {
        let e = ease_in_out_cubic(self.progress(now));
        let travel = screen_w * self.direction.sign();
        SwitchSample {
            prev_view: self.prev_view.translated(lerp(0.0, -travel, e), 0.0),
            prev_alpha: 1.0 - e,
            curr_view: curr_view.translated(lerp(travel, 0.0, e), 0.0),
            curr_alpha: e,
        }
    }
}

/// Short ease-out between two views for step zoom.
#[derive(Debug, Clone)]
pub struct ZoomAnim {
    pub tween: Tween,
    pub from: ViewTransform,
    pub to: ViewTransform,
}

impl ZoomAnim {
    pub fn sample(&self, now: Instant) -> ViewTransform {
        lerp_view(&self.from, &self.to, ease_out_quad(self.tween.progress(now)))
    }
}

/// Ease-in-out between two views landing on a new zoom mode.
#[derive(Debug, Clone)]
pub struct ToggleZoomAnim {
    pub tween: Tween,
    pub from: ViewTransform,
    pub to: ViewTransform,
    pub target_mode: ZoomMode,
}

impl ToggleZoomAnim {
    pub fn sample(&self, now: Instant) -> ViewTransform {
        lerp_view(&self.from, &self.to, ease_in_out_cubic(self.tween.progress(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tween_progress() {
        let t0 = Instant::now();
        let tween = Tween::new(t0, Duration::from_millis(200));
        assert_eq!(tween.progress(t0), 0.0);
        assert!((tween.progress(t0 + Duration::from_millis(50)) - 0.25).abs() < 1e-9);
        assert_eq!(tween.progress(t0 + Duration::from_secs(5)), 1.0);
        assert!(tween.is_done(t0 + Duration::from_millis(200)));

        let instant = Tween::new(t0, Duration::ZERO);
        assert!(instant.is_done(t0));
    }

    #[test]
    fn test_direction_step_stays_in_range() {
        assert_eq!(Direction::Prev.step(0, 3), None);
        assert_eq!(Direction::Prev.step(2, 3), Some(1));
        assert_eq!(Direction::Next.step(2, 3), None);
        assert_eq!(Direction::Next.step(0, 3), Some(1));
        assert_eq!(Direction::between(5, 2), Direction::Prev);
        assert_eq!(Direction::between(2, 5), Direction::Next);
    }

    #[test]
    fn test_switch_slide_endpoints() {
        let t0 = Instant::now();
        let prev = ViewTransform::new(1.0, 100.0, 50.0);
        let curr = ViewTransform::new(0.5, 200.0, 80.0);
        let mut anim = SwitchAnim::new(1, Direction::Next, Duration::from_millis(200), None, prev);

        // Before the target loads nothing moves
        let waiting = anim.sample(t0, &curr, 1000.0);
        assert_eq!(waiting.prev_view, prev);
        assert_eq!(waiting.prev_alpha, 1.0);
        assert!(!anim.is_done(t0 + Duration::from_secs(10)));

        anim.mark_loaded(t0);
        let start = anim.sample(t0, &curr, 1000.0);
        assert_eq!(start.curr_view.offset_x, 1200.0);
        assert_eq!(start.curr_alpha, 0.0);

        let end = anim.sample(t0 + Duration::from_millis(200), &curr, 1000.0);
        assert_eq!(end.prev_view.offset_x, -900.0);
        assert_eq!(end.prev_alpha, 0.0);
        assert_eq!(end.curr_view, curr);
        assert_eq!(end.curr_alpha, 1.0);
        assert!(anim.is_done(t0 + Duration::from_millis(200)));
    }

    #[test]
    fn test_open_sample_reaches_rest() {
        let t0 = Instant::now();
        let anim = OpenAnim {
            tween: Tween::new(t0, Duration::from_millis(300)),
            from: ViewTransform::new(0.6, 10.0, 10.0),
            to: ViewTransform::new(0.95, 5.0, 5.0),
            alpha_start: 0.4,
            background_target: 0.5,
        };
        let first = anim.sample(t0);
        assert_eq!(first.alpha, 0.4);
        assert_eq!(first.background, 0.0);
        let last = anim.sample(t0 + Duration::from_millis(300));
        assert!(last.view.approx_eq(&anim.to, 1e-12));
        assert!((last.alpha - 1.0).abs() < 1e-12);
        assert!((last.background - 0.5).abs() < 1e-12);
    }
}
