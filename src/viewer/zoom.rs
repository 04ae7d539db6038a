//! Step zoom, toggle zoom and panning of the current image.

use tracing::{debug, trace};

use super::{PanGesture, Viewer};
use crate::anim::{ToggleZoomAnim, Tween, ZoomAnim};
use crate::gpu::GpuBackend;
use crate::view::{anchor_zoom, clamp_pan, one_to_one_view, ViewTransform, ZoomMode};

impl<G: GpuBackend + 'static> Viewer<G> {
    /// Zoom and pan are locked while the image is sliding or opening.
    fn view_locked(&self) -> bool {
        self.anim.is_switching() || self.opening() || self.cache.curr().is_none()
    }

    /// Jump running zoom/toggle tweens to their end views.
    pub(super) fn finish_view_tweens(&mut self) {
        if let Some(zoom) = self.anim.zoom.take() {
            self.commit_zoom(zoom.to);
        }
        if let Some(toggle) = self.anim.toggle.take() {
            self.commit_toggle(toggle.to, toggle.target_mode);
        }
    }

    /// Zoom by a relative `step` (0.1 = 10% larger) around a screen point.
    ///
    /// Steps taken while a zoom is still running build on its target, so
    /// fast wheel input accumulates instead of restarting from the
    /// interpolated view.
    pub fn zoom_by(&mut self, step: f64, anchor: (f64, f64)) {
        if self.view_locked() {
            return;
        }
        let Some(image) = self.current_size() else {
            return;
        };
        let base = self
            .anim
            .zoom
            .as_ref()
            .map(|z| z.to)
            .unwrap_or(self.state.view);
        let zoomed = anchor_zoom(&base, base.scale * (1.0 + step), anchor);
        self.start_zoom(clamp_pan(&zoomed, image, self.screen));
    }

    /// Animate from the displayed view to `to`.
    pub fn start_zoom(&mut self, to: ViewTransform) {
        if self.view_locked() {
            return;
        }
        self.pan = None;
        self.anim.toggle = None;
        trace!(scale = to.scale, "Starting zoom");
        self.anim.zoom = Some(ZoomAnim {
            tween: Tween::new(self.clock.now(), self.config.anim_zoom),
            from: self.state.view,
            to,
        });
        self.state.zoom_mode = ZoomMode::Custom;
    }

    pub(super) fn commit_zoom(&mut self, to: ViewTransform) {
        let Some(image) = self.current_size() else {
            return;
        };
        let view = clamp_pan(&to, image, self.screen);
        self.state.set_view(view);
        if let Some(path) = self.list.get(self.index) {
            self.memory.save_view(path, view);
            self.memory.save_user_zoom(path, view);
        }
    }

    /// Cycle 1:1 -> Fit -> Custom -> 1:1 with an animation. Custom is the
    /// last explicit zoom of this image, or fit when there is none.
    pub fn start_toggle_zoom(&mut self) {
        if self.view_locked() {
            return;
        }
        let Some(image) = self.current_size() else {
            return;
        };
        if let Some(zoom) = self.anim.zoom.take() {
            self.commit_zoom(zoom.to);
        }
        let from_mode = match self.anim.toggle.take() {
            Some(running) => running.target_mode,
            None => self.state.zoom_mode,
        };
        let from = self.state.view;
        self.pan = None;

        let target_mode = from_mode.next();
        let to = match target_mode {
            ZoomMode::OneToOne => one_to_one_view(image, self.screen),
            ZoomMode::Fit => self.state.last_fit,
            ZoomMode::Custom => self
                .list
                .get(self.index)
                .and_then(|path| self.memory.user_zoom(path))
                .unwrap_or(self.state.last_fit),
        };
        debug!(?from_mode, ?target_mode, "Toggling zoom");
        self.anim.toggle = Some(ToggleZoomAnim {
            tween: Tween::new(self.clock.now(), self.config.anim_toggle_zoom),
            from,
            to,
            target_mode,
        });
    }

    pub(super) fn commit_toggle(&mut self, to: ViewTransform, mode: ZoomMode) {
        let Some(image) = self.current_size() else {
            return;
        };
        let view = clamp_pan(&to, image, self.screen);
        self.state.set_view(view);
        // The cycle position follows the toggle target, not the landed scale.
        self.state.zoom_mode = mode;
        if let Some(path) = self.list.get(self.index) {
            self.memory.save_view(path, view);
            if mode == ZoomMode::Custom {
                self.memory.save_user_zoom(path, view);
            }
        }
    }

    /// Start dragging. Only a zoomed image can be panned.
    pub fn begin_pan(&mut self, x: f64, y: f64) -> bool {
        if self.view_locked() || !self.state.is_zoomed {
            return false;
        }
        self.finish_view_tweens();
        self.pan = Some(PanGesture { last: (x, y) });
        true
    }

    pub fn update_pan(&mut self, x: f64, y: f64) {
        let Some(pan) = self.pan.as_mut() else {
            return;
        };
        let (dx, dy) = (x - pan.last.0, y - pan.last.1);
        pan.last = (x, y);
        let Some(image) = self.current_size() else {
            return;
        };
        self.state.view = clamp_pan(&self.state.view.translated(dx, dy), image, self.screen);
    }

    /// Finish dragging and remember the result as this image's user zoom.
    pub fn end_pan(&mut self) {
        if self.pan.take().is_none() {
            return;
        }
        let view = self.state.view;
        self.state.zoom_mode = ZoomMode::Custom;
        if let Some(path) = self.list.get(self.index) {
            self.memory.save_view(path, view);
            self.memory.save_user_zoom(path, view);
        }
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_some()
    }
}
