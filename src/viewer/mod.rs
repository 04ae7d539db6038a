//! The viewer context.
//!
//! `Viewer` owns every piece of UI-thread state: the prefetch window, the
//! thumbnail cache, view state and memory, animations and the GPU backend.
//! Decode workers never see it; their results come back as callbacks that
//! run against `&mut Viewer` inside [`Viewer::tick`].

mod frame;
mod navigation;
mod zoom;

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, trace};

use crate::anim::{Finished, Orchestrator};
use crate::clock::Clock;
use crate::config::ViewerConfig;
use crate::decode::{Decoder, ImageProbe};
use crate::error::PoolError;
use crate::gpu::{GpuBackend, TextureHandle, UnloadQueue};
use crate::images::{ImageCache, ImageList};
use crate::loader::{DecodePool, Priority, UiEventDrain};
use crate::thumbnails::ThumbnailCache;
use crate::view::{clamp_pan, fit_view, Size, ViewMemory, ViewState, ViewTransform};

pub use frame::{Frame, Layer};

/// An in-progress drag of a zoomed image.
#[derive(Debug, Clone, Copy)]
struct PanGesture {
    last: (f64, f64),
}

/// Pending gallery-wheel navigation, applied after input settles.
#[derive(Debug, Default, Clone, Copy)]
struct GalleryScroll {
    target: Option<usize>,
    last_input: Option<Instant>,
}

pub struct Viewer<G: GpuBackend + 'static> {
    config: ViewerConfig,
    clock: Arc<dyn Clock>,
    gpu: G,
    probe: Box<dyn ImageProbe>,
    pool: DecodePool<Viewer<G>>,
    events: UiEventDrain<Viewer<G>>,

    list: ImageList,
    index: usize,
    cache: ImageCache,
    thumbs: ThumbnailCache,
    unload: UnloadQueue,

    state: ViewState,
    memory: ViewMemory,
    anim: Orchestrator,
    screen: Size,
    background_opacity: f64,

    /// CURRENT decode outstanding.
    loading: bool,
    /// The outstanding CURRENT decode was classified heavy.
    heavy: bool,
    /// Waiting for the first image before starting the open animation.
    open_pending: bool,
    /// Neighbor loads skipped during an animation, to request once it ends.
    neighbors_deferred: bool,
    pan: Option<PanGesture>,
    gallery: GalleryScroll,
}

impl<G: GpuBackend + 'static> Viewer<G> {
    /// Start the decode pool and build an empty viewer.
    ///
    /// Failing to spawn the worker threads is the only fatal error.
    pub fn new(
        config: ViewerConfig,
        decoder: Arc<dyn Decoder>,
        probe: Box<dyn ImageProbe>,
        gpu: G,
        clock: Arc<dyn Clock>,
        screen: (u32, u32),
    ) -> Result<Self, PoolError> {
        let pool = DecodePool::new(
            config.worker_count(),
            decoder,
            config.max_image_dimension,
            config.shutdown_timeout,
        )?;
        let events = pool.drain();

        Ok(Self {
            thumbs: ThumbnailCache::new(config.thumb_cache_limit),
            anim: Orchestrator::new(config.switch_queue_limit),
            background_opacity: config.background_opacity,
            config,
            clock,
            gpu,
            probe,
            pool,
            events,
            list: ImageList::default(),
            index: 0,
            cache: ImageCache::new(),
            unload: UnloadQueue::new(),
            state: ViewState::default(),
            memory: ViewMemory::new(),
            screen: Size::from(screen),
            loading: false,
            heavy: false,
            open_pending: false,
            neighbors_deferred: false,
            pan: None,
            gallery: GalleryScroll::default(),
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }

    pub fn list(&self) -> &ImageList {
        &self.list
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    pub fn thumbnails(&self) -> &ThumbnailCache {
        &self.thumbs
    }

    pub fn view_state(&self) -> &ViewState {
        &self.state
    }

    pub fn view(&self) -> ViewTransform {
        self.state.view
    }

    pub fn memory(&self) -> &ViewMemory {
        &self.memory
    }

    pub fn animations(&self) -> &Orchestrator {
        &self.anim
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Nothing left to decode, animate or unload.
    pub fn is_idle(&self) -> bool {
        !self.loading
            && !self.open_pending
            && !self.anim.is_animating()
            && self.events.is_empty()
            && self.pool.queued() == 0
            && self.pool.active() == 0
            && self.unload.is_empty()
    }

    fn opening(&self) -> bool {
        self.open_pending || self.anim.is_opening()
    }

    pub fn screen(&self) -> Size {
        self.screen
    }

    /// Viewport resize. The current image is refit when it was showing at fit.
    pub fn set_screen(&mut self, width: u32, height: u32) {
        let was_fit = !self.state.is_zoomed;
        self.screen = Size::from((width, height));
        if let Some(image) = self.current_size() {
            self.state.last_fit = fit_view(image, self.screen, self.config.fit_frac);
            if was_fit {
                self.state.set_view(self.state.last_fit);
            } else {
                let view = clamp_pan(&self.state.view, image, self.screen);
                self.state.set_view(view);
            }
        }
    }

    fn current_size(&self) -> Option<Size> {
        self.cache.curr().map(|t| Size::from((t.width, t.height)))
    }

    /// Run one frame of UI-thread work.
    ///
    /// 1. Drain a budgeted number of decode completions
    /// 2. Submit a budgeted number of thumbnail decodes
    /// 3. Apply a settled gallery-wheel target
    /// 4. Advance animations and handle the ones that finished
    /// 5. Free textures retired this frame
    pub fn tick(&mut self) {
        let budget = if self.opening() {
            self.config.events_per_frame_opening
        } else {
            self.config.events_per_frame
        };
        let events = self.events.clone();
        events.poll(self, budget);

        if !self.opening() {
            self.process_thumbnails();
        }

        let now = self.clock.now();
        self.apply_gallery_target(now);

        for finished in self.anim.update(now) {
            self.on_animation_finished(finished);
        }
        self.sample_animations(now);

        self.unload.flush(&mut self.gpu);
    }

    fn on_animation_finished(&mut self, finished: Finished) {
        match finished {
            Finished::Open(open) => {
                debug!("Open animation complete");
                self.state.set_view(open.to);
                self.background_opacity = open.background_target;
                if self.neighbors_deferred {
                    self.request_neighbors();
                }
                self.thumbs
                    .schedule(self.index, &self.list, self.config.thumb_preload_span);
            }
            Finished::Switch(switch) => self.settle_switch(switch),
            Finished::Zoom(zoom) => self.commit_zoom(zoom.to),
            Finished::ToggleZoom(toggle) => self.commit_toggle(toggle.to, toggle.target_mode),
        }
    }

    /// Write interpolated views from running tweens into the view state.
    fn sample_animations(&mut self, now: Instant) {
        if let Some(open) = &self.anim.open {
            let sample = open.sample(now);
            self.state.view = sample.view;
        }
        if let Some(zoom) = &self.anim.zoom {
            self.state.view = zoom.sample(now);
        }
        if let Some(toggle) = &self.anim.toggle {
            self.state.view = toggle.sample(now);
        }
    }

    /// What to draw right now.
    pub fn current_frame(&self) -> Frame {
        let now = self.clock.now();
        let mut alpha = 1.0;
        let mut background_opacity = self.background_opacity;
        if let Some(open) = &self.anim.open {
            let sample = open.sample(now);
            alpha = sample.alpha;
            background_opacity = sample.background;
        }

        let mut layers = Vec::with_capacity(2);
        match &self.anim.switch {
            Some(switch) if switch.is_loaded() => {
                let sample = switch.sample(now, &self.state.view, self.screen.width);
                if let Some(snapshot) = &switch.snapshot {
                    layers.push(layer(snapshot, sample.prev_view, sample.prev_alpha));
                }
                if let Some(curr) = self.cache.curr() {
                    layers.push(layer(curr, sample.curr_view, sample.curr_alpha));
                }
            }
            Some(switch) => {
                // Still waiting for the target: keep showing the old image.
                if let Some(snapshot) = &switch.snapshot {
                    layers.push(layer(snapshot, switch.prev_view, 1.0));
                }
            }
            None => {
                if let Some(curr) = self.cache.curr() {
                    layers.push(layer(curr, self.state.view, alpha));
                }
            }
        }

        Frame {
            layers,
            background_opacity,
            loading_indicator: self.loading && self.heavy,
        }
    }

    /// Stop the decode pool and destroy every texture still owned.
    pub fn shutdown(&mut self) {
        self.pool.shutdown();

        self.unload.defer_all(self.cache.drain_all());
        self.unload.defer_all(self.thumbs.drain_textures());
        if let Some(switch) = self.anim.switch.take() {
            self.unload.defer_opt(switch.snapshot);
        }
        self.anim.clear_switch_queue();
        self.anim.open = None;
        self.anim.cancel_view_tweens();
        self.open_pending = false;
        self.loading = false;

        let freed = self.unload.flush(&mut self.gpu);
        info!(freed, "Viewer shut down");
    }

    fn process_thumbnails(&mut self) {
        let outcome = self.thumbs.process(self.config.thumb_budget_per_frame);
        self.unload.defer_all(outcome.evicted);
        if outcome.submit.is_empty() {
            return;
        }
        let height = self.config.thumb_height(self.screen.height as u32);
        for path in outcome.submit {
            trace!(?path, height, "Submitting thumbnail decode");
            self.pool.submit(
                path,
                Priority::Gallery,
                Some(height),
                |viewer: &mut Viewer<G>, completion| viewer.on_thumbnail_decoded(completion),
            );
        }
    }
}

fn layer(texture: &TextureHandle, view: ViewTransform, alpha: f64) -> Layer {
    Layer {
        texture: texture.clone(),
        view,
        alpha,
    }
}
