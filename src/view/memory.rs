use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::math::ViewTransform;

/// Per-path views remembered across visits.
///
/// `views` is overwritten on every committed view change. `user_zooms` only
/// changes on explicit zoom or pan commits and feeds the Custom toggle target.
#[derive(Debug, Default)]
pub struct ViewMemory {
    views: HashMap<PathBuf, ViewTransform>,
    user_zooms: HashMap<PathBuf, ViewTransform>,
}

impl ViewMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_view(&mut self, path: &Path, view: ViewTransform) {
        self.views.insert(path.to_path_buf(), view);
    }

    pub fn view(&self, path: &Path) -> Option<ViewTransform> {
        self.views.get(path).copied()
    }

    pub fn save_user_zoom(&mut self, path: &Path, view: ViewTransform) {
        self.user_zooms.insert(path.to_path_buf(), view);
    }

    pub fn user_zoom(&self, path: &Path) -> Option<ViewTransform> {
        self.user_zooms.get(path).copied()
    }

    /// Drop everything remembered for `path`.
    pub fn forget(&mut self, path: &Path) {
        self.views.remove(path);
        self.user_zooms.remove(path);
    }
}
