//! The ordered list of images being browsed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;
use walkdir::WalkDir;

/// Extensions the default decoder can open.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "tga", "gif", "qoi", "webp", "tif", "tiff",
];

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[derive(Debug, Clone, Default)]
pub struct ImageList {
    paths: Vec<PathBuf>,
}

impl ImageList {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Supported images directly inside `dir`, sorted by file name.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(dir)
            .follow_links(true)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.with_context(|| format!("Failed to list {:?}", dir))?;
            if entry.file_type().is_file() && is_supported(entry.path()) {
                paths.push(entry.into_path());
            }
        }
        debug!(?dir, count = paths.len(), "Listed images");
        Ok(Self { paths })
    }

    /// List the directory containing `path` (or `path` itself if it is a
    /// directory). Returns the list and the index to start at.
    pub fn from_path(path: &Path) -> Result<(Self, usize)> {
        if path.is_dir() {
            return Ok((Self::from_dir(path)?, 0));
        }
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let list = Self::from_dir(dir)?;
        let name = path.file_name();
        let start = list
            .paths
            .iter()
            .position(|p| p.file_name() == name)
            .unwrap_or(0);
        Ok((list, start))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.paths.get(index).map(PathBuf::as_path)
    }

    pub fn index_of(&self, path: &Path) -> Option<usize> {
        self.paths.iter().position(|p| p == path)
    }

    /// Clamp `index` into range. 0 for an empty list.
    pub fn clamp(&self, index: usize) -> usize {
        index.min(self.paths.len().saturating_sub(1))
    }

    pub fn remove(&mut self, index: usize) -> Option<PathBuf> {
        (index < self.paths.len()).then(|| self.paths.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_from_dir_filters_and_sorts() {
        let dir = tempdir().unwrap();
        for name in ["b.png", "a.JPG", "notes.txt", "c.webp"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("sub.png")).unwrap();

        let list = ImageList::from_dir(dir.path()).unwrap();
        let names: Vec<_> = list
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "c.webp"]);
    }

    #[test]
    fn test_from_path_starts_at_file() {
        let dir = tempdir().unwrap();
        for name in ["1.png", "2.png", "3.png"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let (list, start) = ImageList::from_path(&dir.path().join("2.png")).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(start, 1);

        let (_, start) = ImageList::from_path(dir.path()).unwrap();
        assert_eq!(start, 0);
    }

    #[test]
    fn test_clamp_and_remove() {
        let mut list = ImageList::new(vec!["a".into(), "b".into()]);
        assert_eq!(list.clamp(7), 1);
        assert_eq!(list.remove(0), Some(PathBuf::from("a")));
        assert_eq!(list.remove(5), None);
        assert_eq!(list.index_of(Path::new("b")), Some(0));
        assert_eq!(ImageList::default().clamp(3), 0);
    }
}
