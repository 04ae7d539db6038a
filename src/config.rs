//! Tunables for the decode pipeline, caches and animations.
//!
//! Defaults match the values the viewer ships with; a handful can be
//! overridden from the environment for profiling on slow disks.

use std::time::Duration;

use tracing::warn;

/// Default number of decode worker threads.
pub const DEFAULT_WORKERS: usize = 10;

/// Maximum number of decode worker threads.
const MAX_WORKERS: usize = 16;

/// Fraction of the viewport an image occupies at fit scale.
pub const FIT_DEFAULT_SCALE: f64 = 0.95;
/// Fraction of the viewport an image starts at during the open animation.
pub const FIT_OPEN_SCALE: f64 = 0.60;
/// Image alpha at the start of the open animation.
pub const OPEN_ALPHA_START: f64 = 0.4;
/// Resting background opacity.
pub const BACKGROUND_OPACITY: f64 = 0.5;

pub const ANIM_OPEN_MS: u64 = 300;
pub const ANIM_SWITCH_KEYS_MS: u64 = 200;
pub const ANIM_SWITCH_GALLERY_MS: u64 = 10;
pub const ANIM_ZOOM_MS: u64 = 100;
pub const ANIM_TOGGLE_ZOOM_MS: u64 = 150;

/// Largest side a decoded image may have before it is downscaled for upload.
pub const MAX_IMAGE_DIMENSION: u32 = 8192;
/// Files above this size are rejected without decoding.
pub const MAX_FILE_SIZE_MB: u64 = 200;
/// Files at or above this size show a loading indicator.
pub const HEAVY_FILE_SIZE_MB: u64 = 10;
/// Images whose short side reaches this many pixels show a loading indicator.
pub const HEAVY_MIN_SHORT_SIDE: u32 = 4000;

pub const THUMB_CACHE_LIMIT: usize = 400;
pub const THUMB_PRELOAD_SPAN: usize = 40;
pub const THUMB_BUILD_BUDGET_PER_FRAME: usize = 2;

/// Completed decodes drained per frame.
pub const EVENTS_PER_FRAME: usize = 8;
/// Completed decodes drained per frame while the open animation runs.
pub const EVENTS_PER_FRAME_OPENING: usize = 2;

/// Pending switch requests kept while a switch animates.
pub const SWITCH_QUEUE_LIMIT: usize = 20;

pub const GALLERY_HEIGHT_FRAC: f64 = 0.12;
pub const GALLERY_SETTLE_DEBOUNCE_MS: u64 = 120;

const SHUTDOWN_TIMEOUT_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub workers: usize,
    pub fit_frac: f64,
    pub open_frac: f64,
    pub open_alpha_start: f64,
    pub background_opacity: f64,
    pub anim_open: Duration,
    pub anim_switch_keys: Duration,
    pub anim_switch_gallery: Duration,
    pub anim_zoom: Duration,
    pub anim_toggle_zoom: Duration,
    pub max_image_dimension: u32,
    pub max_file_bytes: u64,
    pub heavy_file_bytes: u64,
    pub heavy_min_short_side: u32,
    pub thumb_cache_limit: usize,
    pub thumb_preload_span: usize,
    pub thumb_budget_per_frame: usize,
    pub events_per_frame: usize,
    pub events_per_frame_opening: usize,
    pub switch_queue_limit: usize,
    pub gallery_height_frac: f64,
    pub gallery_settle_debounce: Duration,
    pub shutdown_timeout: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            fit_frac: FIT_DEFAULT_SCALE,
            open_frac: FIT_OPEN_SCALE,
            open_alpha_start: OPEN_ALPHA_START,
            background_opacity: BACKGROUND_OPACITY,
            anim_open: Duration::from_millis(ANIM_OPEN_MS),
            anim_switch_keys: Duration::from_millis(ANIM_SWITCH_KEYS_MS),
            anim_switch_gallery: Duration::from_millis(ANIM_SWITCH_GALLERY_MS),
            anim_zoom: Duration::from_millis(ANIM_ZOOM_MS),
            anim_toggle_zoom: Duration::from_millis(ANIM_TOGGLE_ZOOM_MS),
            max_image_dimension: MAX_IMAGE_DIMENSION,
            max_file_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            heavy_file_bytes: HEAVY_FILE_SIZE_MB * 1024 * 1024,
            heavy_min_short_side: HEAVY_MIN_SHORT_SIDE,
            thumb_cache_limit: THUMB_CACHE_LIMIT,
            thumb_preload_span: THUMB_PRELOAD_SPAN,
            thumb_budget_per_frame: THUMB_BUILD_BUDGET_PER_FRAME,
            events_per_frame: EVENTS_PER_FRAME,
            events_per_frame_opening: EVENTS_PER_FRAME_OPENING,
            switch_queue_limit: SWITCH_QUEUE_LIMIT,
            gallery_height_frac: GALLERY_HEIGHT_FRAC,
            gallery_settle_debounce: Duration::from_millis(GALLERY_SETTLE_DEBOUNCE_MS),
            shutdown_timeout: Duration::from_millis(SHUTDOWN_TIMEOUT_MS),
        }
    }
}

impl ViewerConfig {
    /// Defaults with `IMAGURA_WORKERS`, `IMAGURA_THUMB_CACHE` and
    /// `IMAGURA_EVENTS_PER_FRAME` applied when they parse to a positive number.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(workers) = env_usize("IMAGURA_WORKERS") {
            config.workers = workers;
        }
        if let Some(limit) = env_usize("IMAGURA_THUMB_CACHE") {
            config.thumb_cache_limit = limit;
        }
        if let Some(events) = env_usize("IMAGURA_EVENTS_PER_FRAME") {
            config.events_per_frame = events;
        }
        config
    }

    /// Worker count clamped to a sane range.
    pub fn worker_count(&self) -> usize {
        self.workers.clamp(1, MAX_WORKERS)
    }

    /// Target thumbnail height for a viewport of the given height.
    pub fn thumb_height(&self, screen_h: u32) -> u32 {
        ((screen_h as f64 * self.gallery_height_frac * 0.8) as u32).max(1)
    }
}

fn env_usize(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(v) if v > 0 => Some(v),
        _ => {
            warn!(name, value = %raw, "Ignoring invalid environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count_clamping() {
        let mut config = ViewerConfig::default();
        config.workers = 0;
        assert_eq!(config.worker_count(), 1);
        config.workers = 64;
        assert_eq!(config.worker_count(), MAX_WORKERS);
        config.workers = 4;
        assert_eq!(config.worker_count(), 4);
    }

    #[test]
    fn test_thumb_height_follows_gallery_strip() {
        let config = ViewerConfig::default();
        // 1000 * 0.12 * 0.8 = 96
        assert_eq!(config.thumb_height(1000), 96);
        assert_eq!(config.thumb_height(0), 1);
    }

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.switch_queue_limit, 20);
        assert_eq!(config.thumb_cache_limit, 400);
        assert_eq!(config.anim_switch_keys, Duration::from_millis(200));
        assert!((config.fit_frac - 0.95).abs() < f64::EPSILON);
    }
}
