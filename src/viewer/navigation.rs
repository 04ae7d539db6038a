//! Index changes, the prefetch window and the switch state machine.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{debug, info, trace, warn};

use super::Viewer;
use crate::anim::{Direction, OpenAnim, SwitchAnim, SwitchRequest, Tween};
use crate::decode::RawImage;
use crate::gpu::{upload_texture, GpuBackend, TextureHandle};
use crate::images::{ImageList, Slot};
use crate::loader::{Completion, Priority};
use crate::view::{fit_view, sanitize_view, ViewState};

impl<G: GpuBackend + 'static> Viewer<G> {
    /// Show `list` starting at `start`. With `animate`, the open animation
    /// runs once the first image arrives, and neighbor and thumbnail loads
    /// wait until it finishes.
    pub fn open(&mut self, list: ImageList, start: usize, animate: bool) {
        info!(count = list.len(), start, animate, "Opening image list");
        self.end_transients();
        self.unload.defer_all(self.cache.drain_all());
        self.unload.defer_all(self.thumbs.drain_textures());
        self.list = list;
        self.index = self.list.clamp(start);
        self.open_pending = animate && !self.list.is_empty();
        self.background_opacity = if animate {
            0.0
        } else {
            self.config.background_opacity
        };
        self.shift_window(self.index, animate);
    }

    /// Show `new_index` (clamped) without animation.
    ///
    /// Any switch, pan or zoom in progress ends first, then the prefetch
    /// window moves: a CURRENT decode for the target unless it is already
    /// loaded, and NEIGHBOR decodes for index +/- 1 unless `skip_neighbors`
    /// is set.
    pub fn set_index(&mut self, new_index: usize, skip_neighbors: bool) {
        self.end_transients();
        self.shift_window(new_index, skip_neighbors);
    }

    /// Settle everything tied to the image on screen before an index change
    /// that bypasses the switch animation.
    fn end_transients(&mut self) {
        self.settle_switch_now();
        self.finish_open_now();
        self.pan = None;
        self.finish_view_tweens();
        self.gallery = Default::default();
    }

    fn shift_window(&mut self, new_index: usize, skip_neighbors: bool) {
        if self.list.is_empty() {
            self.unload.defer_all(self.cache.drain_all());
            self.index = 0;
            self.loading = false;
            self.heavy = false;
            self.state = ViewState::default();
            return;
        }
        let new_index = self.list.clamp(new_index);
        self.persist_current_view();

        let retired = self.cache.recenter(new_index, &self.list);
        if !retired.is_empty() {
            trace!(count = retired.len(), "Retiring textures outside the window");
        }
        for texture in retired {
            self.retire(texture);
        }
        self.index = new_index;

        self.load_current();
        if skip_neighbors {
            self.neighbors_deferred = true;
        } else {
            self.request_neighbors();
        }
        if !self.opening() {
            self.thumbs
                .schedule(new_index, &self.list, self.config.thumb_preload_span);
        }
    }

    /// Queue a texture that left the window for unload, unless a running
    /// switch still draws it as its snapshot.
    fn retire(&mut self, texture: TextureHandle) {
        let is_snapshot = self
            .anim
            .switch
            .as_ref()
            .and_then(|switch| switch.snapshot.as_ref())
            .is_some_and(|snapshot| snapshot.id == texture.id);
        if !is_snapshot {
            self.unload.defer(texture);
        }
    }

    /// Free a finished switch's snapshot unless the window still holds it
    /// (stepping one image keeps it as the new prev or next).
    fn release_snapshot(&mut self, snapshot: Option<TextureHandle>) {
        if let Some(texture) = snapshot {
            if !self.cache.holds(texture.id) {
                self.unload.defer(texture);
            }
        }
    }

    /// Save the displayed view of the current image.
    fn persist_current_view(&mut self) {
        if self.cache.curr().is_none() {
            return;
        }
        if let Some(path) = self.list.get(self.index) {
            self.memory.save_view(path, self.state.view);
        }
    }

    fn load_current(&mut self) {
        let Some(path) = self.list.get(self.index).map(Path::to_path_buf) else {
            return;
        };
        if self.cache.curr().is_some() {
            self.loading = false;
            self.heavy = false;
            self.apply_current_view(&path);
            return;
        }

        self.loading = true;
        self.heavy = self.probe.is_heavy(&path);
        if self.heavy {
            debug!(?path, "Heavy image, showing loading indicator");
        }
        self.submit_full(path, Priority::Current);
    }

    pub(super) fn request_neighbors(&mut self) {
        self.neighbors_deferred = false;
        let neighbors = [
            self.index.checked_sub(1),
            self.index.checked_add(1),
        ];
        for i in neighbors.into_iter().flatten() {
            let Some(path) = self.list.get(i).map(Path::to_path_buf) else {
                continue;
            };
            if !self.cache.has_or_loading(&path) {
                self.submit_full(path, Priority::Neighbor);
            }
        }
    }

    fn submit_full(&mut self, path: PathBuf, priority: Priority) {
        if !self.cache.begin_load(&path) {
            // A prefetch for what is now the current image must not wait
            // behind the rest of the neighbor backlog.
            if priority == Priority::Current && self.pool.promote(&path, priority) {
                debug!(?path, "Promoted in-flight decode to current");
            } else {
                trace!(?path, ?priority, "Decode already in flight");
            }
            return;
        }
        self.pool.submit(path, priority, None, |viewer: &mut Viewer<G>, completion| {
            viewer.on_full_decoded(completion)
        });
    }

    /// Restore the remembered view for the current image, or fit it.
    fn apply_current_view(&mut self, path: &Path) {
        let Some(image) = self.current_size() else {
            return;
        };
        let fit = fit_view(image, self.screen, self.config.fit_frac);
        let view = match self.memory.view(path) {
            Some(saved) => sanitize_view(&saved, image, self.screen),
            None => fit,
        };
        self.state = ViewState::new(view, fit);
    }

    /// UI-thread handler for a full-size decode.
    pub(super) fn on_full_decoded(&mut self, completion: Completion) -> anyhow::Result<()> {
        let Completion {
            path,
            priority,
            result,
            elapsed,
        } = completion;
        self.cache.finish_load(&path);

        let slot = self
            .list
            .index_of(&path)
            .and_then(|resolved| Slot::relative(self.index, resolved));
        let Some(slot) = slot else {
            debug!(?path, ?priority, index = self.index, "Discarding stale decode");
            return Ok(());
        };
        if self.cache.get(slot).is_some_and(|t| t.is_for(&path)) {
            trace!(?path, ?slot, "Slot already holds this image");
            return Ok(());
        }

        let uploaded = match result {
            Ok(image) => upload_texture(&mut self.gpu, &image, &path)
                .with_context(|| format!("Failed to upload {:?}", path)),
            Err(e) => Err(anyhow::Error::new(e)),
        };

        match (slot, uploaded) {
            (Slot::Curr, Ok(texture)) => {
                debug!(
                    ?path,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Current image ready"
                );
                self.place_current(texture, &path);
                Ok(())
            }
            (Slot::Curr, Err(e)) => {
                warn!(?path, error = ?e, "Current image failed, showing placeholder");
                let placeholder = upload_texture(&mut self.gpu, &RawImage::placeholder(), &path);
                match placeholder {
                    Ok(texture) => {
                        self.place_current(texture, &path);
                        Ok(())
                    }
                    Err(upload_err) => {
                        // Nothing to show; still release the switch and the indicator.
                        self.loading = false;
                        self.heavy = false;
                        self.on_current_arrived();
                        Err(upload_err).context("Failed to upload placeholder")
                    }
                }
            }
            (slot, Ok(texture)) => {
                trace!(?path, ?slot, "Neighbor ready");
                if let Some(old) = self.cache.set(slot, texture) {
                    self.retire(old);
                }
                Ok(())
            }
            (slot, Err(e)) => {
                warn!(?path, ?slot, error = ?e, "Neighbor failed to load");
                Ok(())
            }
        }
    }

    fn place_current(&mut self, texture: TextureHandle, path: &Path) {
        if let Some(old) = self.cache.set(Slot::Curr, texture) {
            self.retire(old);
        }
        self.loading = false;
        self.heavy = false;
        self.apply_current_view(path);
        self.on_current_arrived();
    }

    /// The current slot was resolved (image, placeholder or nothing).
    fn on_current_arrived(&mut self) {
        let now = self.clock.now();
        if let Some(switch) = self.anim.switch.as_mut() {
            if switch.target == self.index && !switch.is_loaded() {
                trace!(target = switch.target, "Switch target loaded, starting slide");
                switch.mark_loaded(now);
            }
        }
        if self.open_pending {
            self.start_open(now);
        }
    }

    fn start_open(&mut self, now: Instant) {
        self.open_pending = false;
        let Some(image) = self.current_size() else {
            return;
        };
        let from = fit_view(image, self.screen, self.config.open_frac);
        debug!("Starting open animation");
        self.anim.open = Some(OpenAnim {
            tween: Tween::new(now, self.config.anim_open),
            from,
            to: self.state.view,
            alpha_start: self.config.open_alpha_start,
            background_target: self.config.background_opacity,
        });
        self.state.view = from;
    }

    /// Skip the rest of the open animation.
    fn finish_open_now(&mut self) {
        if let Some(open) = self.anim.open.take() {
            self.state.set_view(open.to);
            self.background_opacity = open.background_target;
        }
        if self.open_pending {
            self.open_pending = false;
            self.background_opacity = self.config.background_opacity;
        }
    }

    /// UI-thread handler for a thumbnail decode.
    pub(super) fn on_thumbnail_decoded(&mut self, completion: Completion) -> anyhow::Result<()> {
        let path = completion.path;
        if !self.thumbs.awaiting(&path) {
            trace!(?path, "Thumbnail no longer wanted");
            return Ok(());
        }
        let image = match completion.result {
            Ok(image) => image,
            Err(e) => {
                warn!(?path, error = %e, "Thumbnail failed");
                self.thumbs.mark_failed(&path);
                return Ok(());
            }
        };
        match upload_texture(&mut self.gpu, &image, &path) {
            Ok(texture) => {
                if let Some(stale) = self.thumbs.mark_ready(&path, texture) {
                    self.unload.defer(stale);
                }
                Ok(())
            }
            Err(e) => {
                self.thumbs.mark_failed(&path);
                Err(e).with_context(|| format!("Failed to upload thumbnail {:?}", path))
            }
        }
    }

    /// Animated step to the previous or next image. While a switch is
    /// animating the request is queued and replayed after it settles.
    pub fn start_switch(&mut self, direction: Direction, duration: Duration) {
        if self.list.is_empty() {
            return;
        }
        if self.anim.is_switching() {
            let request = SwitchRequest {
                direction,
                duration,
            };
            if self.anim.queue_switch(request).is_some() {
                debug!("Dropped oldest queued switch");
            }
            return;
        }
        self.try_switch(direction, duration);
    }

    /// Switch one step if possible. Returns false at either end of the list.
    fn try_switch(&mut self, direction: Direction, duration: Duration) -> bool {
        match direction.step(self.index, self.list.len()) {
            Some(target) => {
                self.switch_to(target, duration);
                true
            }
            None => false,
        }
    }

    /// Animated change to `target`.
    pub fn switch_to(&mut self, target: usize, duration: Duration) {
        let target = self.list.clamp(target);
        if self.list.is_empty() || target == self.index || self.anim.is_switching() {
            return;
        }
        self.finish_open_now();
        self.pan = None;
        self.finish_view_tweens();
        self.persist_current_view();

        let direction = Direction::between(self.index, target);
        // The outgoing texture stays in the window too; recentering moves it
        // to prev/next when the step is adjacent.
        let snapshot = self.cache.curr().cloned();
        debug!(from = self.index, target, ?direction, "Starting switch");
        self.anim.switch = Some(SwitchAnim::new(
            target,
            direction,
            duration,
            snapshot,
            self.state.view,
        ));

        // More switches queued: leave neighbors for after the burst.
        let burst = self.anim.queued_switches() > 0;
        self.shift_window(target, burst);
        if self.cache.curr().is_some() {
            self.on_current_arrived();
        }
    }

    /// A switch slide completed.
    pub(super) fn settle_switch(&mut self, switch: SwitchAnim) {
        self.release_snapshot(switch.snapshot);
        if let (Some(image), Some(path)) = (self.current_size(), self.list.get(self.index)) {
            let view = sanitize_view(&self.state.view, image, self.screen);
            self.state.set_view(view);
            self.memory.save_view(path, view);
        }
        trace!(index = self.index, "Switch settled");

        while let Some(request) = self.anim.next_queued_switch() {
            if self.try_switch(request.direction, request.duration) {
                return;
            }
        }
        if self.neighbors_deferred && !self.opening() {
            self.request_neighbors();
        }
    }

    /// End any switch at once, freeing its snapshot and dropping queued requests.
    fn settle_switch_now(&mut self) {
        if let Some(switch) = self.anim.switch.take() {
            debug!(target = switch.target, "Forcing switch to settle");
            self.release_snapshot(switch.snapshot);
        }
        self.anim.clear_switch_queue();
    }

    /// Jump straight to `index` without animation.
    pub fn jump_to(&mut self, index: usize) {
        self.set_index(index, false);
    }

    /// Drop the current image from the list (e.g. deleted on disk) and show
    /// the one that takes its place.
    pub fn remove_current(&mut self) -> Option<PathBuf> {
        self.settle_switch_now();
        self.finish_open_now();
        self.pan = None;
        self.anim.cancel_view_tweens();
        self.gallery = Default::default();

        let removed = self.list.remove(self.index)?;
        info!(path = ?removed, "Removed current image");
        self.unload.defer_opt(self.cache.take(Slot::Curr));
        self.unload.defer_opt(self.thumbs.remove(&removed));
        self.memory.forget(&removed);

        let next = self.index.min(self.list.len().saturating_sub(1));
        self.shift_window(next, false);
        Some(removed)
    }

    /// Move the gallery selection by `steps` and preload thumbnails around it.
    /// The switch itself happens in `tick` once the wheel has been still for
    /// the debounce window.
    pub fn gallery_scroll(&mut self, steps: i64) {
        if self.list.is_empty() || steps == 0 {
            return;
        }
        let base = self.gallery.target.unwrap_or(self.index) as i64;
        let last = self.list.len() as i64 - 1;
        let target = (base + steps).clamp(0, last) as usize;
        self.gallery.target = Some(target);
        self.gallery.last_input = Some(self.clock.now());
        self.thumbs
            .schedule(target, &self.list, self.config.thumb_preload_span);
    }

    pub fn gallery_target(&self) -> Option<usize> {
        self.gallery.target
    }

    pub(super) fn apply_gallery_target(&mut self, now: Instant) {
        let (Some(target), Some(last_input)) = (self.gallery.target, self.gallery.last_input) else {
            return;
        };
        if now.saturating_duration_since(last_input) < self.config.gallery_settle_debounce {
            return;
        }
        if self.anim.is_switching() {
            return;
        }
        self.gallery = Default::default();
        if target != self.index {
            self.switch_to(target, self.config.anim_switch_gallery);
        }
    }
}
