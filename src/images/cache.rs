//! Three-slot prefetch window around the current index.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::list::ImageList;
use crate::gpu::{TextureHandle, TextureId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Prev,
    Curr,
    Next,
}

impl Slot {
    /// Slot that `resolved` occupies relative to `current`, if any.
    pub fn relative(current: usize, resolved: usize) -> Option<Self> {
        if resolved == current {
            Some(Slot::Curr)
        } else if resolved + 1 == current {
            Some(Slot::Prev)
        } else if resolved == current + 1 {
            Some(Slot::Next)
        } else {
            None
        }
    }
}

#[derive(Debug, Default)]
pub struct ImageCache {
    prev: Option<TextureHandle>,
    curr: Option<TextureHandle>,
    next: Option<TextureHandle>,
    /// Paths with a full-size decode submitted and not yet delivered.
    in_flight: HashSet<PathBuf>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: Slot) -> Option<&TextureHandle> {
        self.slot_ref(slot).as_ref()
    }

    pub fn curr(&self) -> Option<&TextureHandle> {
        self.curr.as_ref()
    }

    /// Put `texture` in `slot`, returning whatever it replaced.
    pub fn set(&mut self, slot: Slot, texture: TextureHandle) -> Option<TextureHandle> {
        self.slot_mut(slot).replace(texture)
    }

    pub fn take(&mut self, slot: Slot) -> Option<TextureHandle> {
        self.slot_mut(slot).take()
    }

    /// Shift the window to `index`. Textures already loaded for a path that
    /// stays in the window move to their new slot; the rest are returned for
    /// deferred unload.
    pub fn recenter(&mut self, index: usize, list: &ImageList) -> Vec<TextureHandle> {
        let mut old: Vec<TextureHandle> = [self.prev.take(), self.curr.take(), self.next.take()]
            .into_iter()
            .flatten()
            .collect();

        let mut claim = |path: Option<&Path>| {
            let path = path?;
            let pos = old.iter().position(|t| t.is_for(path))?;
            Some(old.swap_remove(pos))
        };

        self.curr = claim(list.get(index));
        self.prev = claim(index.checked_sub(1).and_then(|i| list.get(i)));
        self.next = claim(list.get(index + 1));
        old
    }

    /// Record a submitted decode. Returns false if one is already in flight.
    pub fn begin_load(&mut self, path: &Path) -> bool {
        self.in_flight.insert(path.to_path_buf())
    }

    pub fn finish_load(&mut self, path: &Path) {
        self.in_flight.remove(path);
    }

    pub fn is_loading(&self, path: &Path) -> bool {
        self.in_flight.contains(path)
    }

    /// Whether `path` is loaded in any slot or on its way.
    pub fn has_or_loading(&self, path: &Path) -> bool {
        self.is_loading(path)
            || [&self.prev, &self.curr, &self.next]
                .into_iter()
                .flatten()
                .any(|t| t.is_for(path))
    }

    /// Whether any slot holds the texture `id`.
    pub fn holds(&self, id: TextureId) -> bool {
        [&self.prev, &self.curr, &self.next]
            .into_iter()
            .flatten()
            .any(|t| t.id == id)
    }

    /// Empty every slot.
    pub fn drain_all(&mut self) -> Vec<TextureHandle> {
        [self.prev.take(), self.curr.take(), self.next.take()]
            .into_iter()
            .flatten()
            .collect()
    }

    fn slot_ref(&self, slot: Slot) -> &Option<TextureHandle> {
        match slot {
            Slot::Prev => &self.prev,
            Slot::Curr => &self.curr,
            Slot::Next => &self.next,
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<TextureHandle> {
        match slot {
            Slot::Prev => &mut self.prev,
            Slot::Curr => &mut self.curr,
            Slot::Next => &mut self.next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tex(id: u64, path: &str) -> TextureHandle {
        TextureHandle {
            id: TextureId(id),
            width: 10,
            height: 10,
            path: PathBuf::from(path),
        }
    }

    fn list() -> ImageList {
        ImageList::new(["a", "b", "c", "d"].iter().map(PathBuf::from).collect())
    }

    #[test]
    fn test_slot_relative() {
        assert_eq!(Slot::relative(3, 3), Some(Slot::Curr));
        assert_eq!(Slot::relative(3, 2), Some(Slot::Prev));
        assert_eq!(Slot::relative(3, 4), Some(Slot::Next));
        assert_eq!(Slot::relative(3, 5), None);
        assert_eq!(Slot::relative(0, 1), Some(Slot::Next));
    }

    #[test]
    fn test_recenter_reuses_by_path() {
        let mut cache = ImageCache::new();
        cache.set(Slot::Prev, tex(1, "a"));
        cache.set(Slot::Curr, tex(2, "b"));
        cache.set(Slot::Next, tex(3, "c"));

        let retired = cache.recenter(2, &list());
        assert_eq!(retired, vec![tex(1, "a")]);
        assert_eq!(cache.get(Slot::Prev), Some(&tex(2, "b")));
        assert_eq!(cache.get(Slot::Curr), Some(&tex(3, "c")));
        assert_eq!(cache.get(Slot::Next), None);
    }

    #[test]
    fn test_recenter_keeps_shared_current_as_prev() {
        let mut cache = ImageCache::new();
        cache.set(Slot::Curr, tex(1, "a"));
        let snapshot = cache.curr().cloned();

        assert!(cache.recenter(1, &list()).is_empty());
        assert_eq!(cache.get(Slot::Prev), snapshot.as_ref());
        assert!(cache.holds(TextureId(1)));
        assert!(!cache.holds(TextureId(2)));
    }

    #[test]
    fn test_recenter_far_jump_retires_everything() {
        let mut cache = ImageCache::new();
        cache.set(Slot::Curr, tex(1, "a"));
        cache.set(Slot::Next, tex(2, "b"));
        let mut retired = cache.recenter(3, &list());
        retired.sort_by_key(|t| t.id);
        assert_eq!(retired.len(), 2);
        assert!(cache.drain_all().is_empty());
    }

    #[test]
    fn test_in_flight_tracking() {
        let mut cache = ImageCache::new();
        assert!(cache.begin_load(Path::new("a")));
        assert!(!cache.begin_load(Path::new("a")));
        assert!(cache.has_or_loading(Path::new("a")));
        cache.finish_load(Path::new("a"));
        assert!(!cache.has_or_loading(Path::new("a")));
    }
}
