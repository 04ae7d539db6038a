//! Heavy-image classification.
//!
//! Reads only file metadata and the image header, so it is cheap enough to
//! run on the UI thread right before a CURRENT decode is submitted.

use std::path::Path;

use image::ImageReader;
use tracing::trace;

/// Decides whether a decode is likely slow enough to warrant a loading indicator.
pub trait ImageProbe {
    fn is_heavy(&self, path: &Path) -> bool;
}

#[derive(Debug, Clone)]
pub struct FileProbe {
    heavy_file_bytes: u64,
    heavy_min_short_side: u32,
}

impl FileProbe {
    pub fn new(heavy_file_bytes: u64, heavy_min_short_side: u32) -> Self {
        Self {
            heavy_file_bytes,
            heavy_min_short_side,
        }
    }

    /// Reads dimensions from the header without decoding pixels.
    pub fn probe_dimensions(path: &Path) -> Option<(u32, u32)> {
        let reader = ImageReader::open(path).ok()?.with_guessed_format().ok()?;
        reader.into_dimensions().ok()
    }
}

impl ImageProbe for FileProbe {
    fn is_heavy(&self, path: &Path) -> bool {
        if let Ok(meta) = std::fs::metadata(path) {
            if meta.len() >= self.heavy_file_bytes {
                trace!(?path, size = meta.len(), "Heavy by file size");
                return true;
            }
        }

        match Self::probe_dimensions(path) {
            Some((w, h)) if w.min(h) >= self.heavy_min_short_side => {
                trace!(?path, w, h, "Heavy by dimensions");
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_heavy_by_file_size() {
        let mut temp = NamedTempFile::with_suffix(".jpg").unwrap();
        temp.write_all(&[0u8; 128]).unwrap();

        assert!(FileProbe::new(100, u32::MAX).is_heavy(temp.path()));
        assert!(!FileProbe::new(1000, u32::MAX).is_heavy(temp.path()));
    }

    #[test]
    fn test_heavy_by_short_side() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wide.png");
        image::RgbaImage::new(40, 20).save(&path).unwrap();

        assert_eq!(FileProbe::probe_dimensions(&path), Some((40, 20)));
        assert!(FileProbe::new(u64::MAX, 20).is_heavy(&path));
        assert!(!FileProbe::new(u64::MAX, 21).is_heavy(&path));
    }

    #[test]
    fn test_missing_file_is_not_heavy() {
        let probe = FileProbe::new(1, 1);
        assert!(!probe.is_heavy(Path::new("/nonexistent/image.png")));
    }
}
