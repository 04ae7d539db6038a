//! Gallery thumbnail cache.
//!
//! - Bounded map of path -> thumbnail texture, evicting the oldest insertion
//! - Reads use `peek`, so lookups never change eviction order
//! - A pending entry is inserted as soon as a decode is submitted, so the
//!   same path is never scheduled twice
//!
//! Only the UI thread touches this cache. Workers hand results back through
//! the decode pool's completion queue.

use std::collections::{HashSet, VecDeque};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use lru::LruCache;
use tracing::{debug, trace};

use crate::gpu::TextureHandle;
use crate::images::ImageList;

#[derive(Debug, Clone, PartialEq)]
pub enum ThumbnailState {
    /// Decode submitted, result not yet delivered.
    Pending,
    Ready(TextureHandle),
    /// Decode or upload failed. Not retried.
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailEntry {
    pub path: PathBuf,
    pub state: ThumbnailState,
}

impl ThumbnailEntry {
    pub fn is_ready(&self) -> bool {
        matches!(self.state, ThumbnailState::Ready(_))
    }

    pub fn texture(&self) -> Option<&TextureHandle> {
        match &self.state {
            ThumbnailState::Ready(texture) => Some(texture),
            _ => None,
        }
    }

    /// Thumbnail size in pixels once ready.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.texture().map(|t| (t.width, t.height))
    }
}

/// Result of one [`ThumbnailCache::process`] call.
#[derive(Debug, Default)]
pub struct ProcessOutcome {
    /// Paths that now need a GALLERY decode.
    pub submit: Vec<PathBuf>,
    /// Textures pushed out by eviction, to be unloaded.
    pub evicted: Vec<TextureHandle>,
}

pub struct ThumbnailCache {
    entries: LruCache<PathBuf, ThumbnailEntry>,
    queue: VecDeque<PathBuf>,
    queued: HashSet<PathBuf>,
}

impl ThumbnailCache {
    pub fn new(limit: usize) -> Self {
        let capacity = NonZeroUsize::new(limit.max(1)).unwrap_or(NonZeroUsize::MIN);
        debug!(limit = capacity.get(), "Initialized thumbnail cache");
        Self {
            entries: LruCache::new(capacity),
            queue: VecDeque::new(),
            queued: HashSet::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn get(&self, path: &Path) -> Option<&ThumbnailEntry> {
        self.entries.peek(path)
    }

    /// Queue every path within `span` of `around` that is neither cached nor
    /// already queued. Returns the number of paths added.
    pub fn schedule(&mut self, around: usize, list: &ImageList, span: usize) -> usize {
        if list.is_empty() {
            return 0;
        }
        let around = list.clamp(around);
        let lo = around.saturating_sub(span);
        let hi = list.clamp(around.saturating_add(span));

        let mut added = 0;
        for path in (lo..=hi).filter_map(|i| list.get(i)) {
            if self.entries.contains(path) || self.queued.contains(path) {
                continue;
            }
            self.queued.insert(path.to_path_buf());
            self.queue.push_back(path.to_path_buf());
            added += 1;
        }
        if added > 0 {
            trace!(around, added, queued = self.queue.len(), "Scheduled thumbnails");
        }
        added
    }

    /// Take up to `budget` queued paths, inserting a pending entry for each.
    pub fn process(&mut self, budget: usize) -> ProcessOutcome {
        let mut outcome = ProcessOutcome::default();
        while outcome.submit.len() < budget {
            let Some(path) = self.queue.pop_front() else {
                break;
            };
            self.queued.remove(&path);
            if self.entries.contains(&path) {
                continue;
            }

            let entry = ThumbnailEntry {
                path: path.clone(),
                state: ThumbnailState::Pending,
            };
            if let Some((old_path, old)) = self.entries.push(path.clone(), entry) {
                trace!(path = ?old_path, "Evicted thumbnail");
                if let ThumbnailState::Ready(texture) = old.state {
                    outcome.evicted.push(texture);
                }
            }
            outcome.submit.push(path);
        }
        outcome
    }

    /// Store a finished thumbnail. If the entry was evicted while its decode
    /// was in flight, the texture is handed back so the caller can unload it.
    pub fn mark_ready(&mut self, path: &Path, texture: TextureHandle) -> Option<TextureHandle> {
        match self.entries.peek_mut(path) {
            Some(entry) if entry.state == ThumbnailState::Pending => {
                entry.state = ThumbnailState::Ready(texture);
                None
            }
            _ => {
                debug!(?path, "Discarding stale thumbnail");
                Some(texture)
            }
        }
    }

    pub fn mark_failed(&mut self, path: &Path) {
        if let Some(entry) = self.entries.peek_mut(path) {
            entry.state = ThumbnailState::Failed;
        }
    }

    /// Whether a decode result for `path` is still wanted.
    pub fn awaiting(&self, path: &Path) -> bool {
        matches!(
            self.entries.peek(path),
            Some(ThumbnailEntry {
                state: ThumbnailState::Pending,
                ..
            })
        )
    }

    /// Drop the entry for a path removed from the list.
    pub fn remove(&mut self, path: &Path) -> Option<TextureHandle> {
        self.queued.remove(path);
        self.queue.retain(|p| p != path);
        match self.entries.pop(path)?.state {
            ThumbnailState::Ready(texture) => Some(texture),
            _ => None,
        }
    }

    /// Empty the cache and queue, returning every ready texture.
    pub fn drain_textures(&mut self) -> Vec<TextureHandle> {
        self.queue.clear();
        self.queued.clear();
        let mut textures = Vec::new();
        while let Some((_, entry)) = self.entries.pop_lru() {
            if let ThumbnailState::Ready(texture) = entry.state {
                textures.push(texture);
            }
        }
        textures
    }
}
