//! Headless backend that keeps "textures" as byte counts in a map.
//!
//! Used by the binary and by tests to observe exactly which textures are
//! alive and in which order they were destroyed.

use std::collections::HashMap;

use tracing::{trace, warn};

use super::{GpuBackend, TextureId};
use crate::decode::RawImage;
use crate::error::GpuError;

#[derive(Debug, Default)]
pub struct MemoryGpu {
    next_id: u64,
    live: HashMap<TextureId, usize>,
    uploads: usize,
    destroyed: Vec<TextureId>,
    fail_uploads: usize,
}

impl MemoryGpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` uploads fail.
    pub fn fail_next_uploads(&mut self, count: usize) {
        self.fail_uploads = count;
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, id: TextureId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn upload_count(&self) -> usize {
        self.uploads
    }

    pub fn destroyed(&self) -> &[TextureId] {
        &self.destroyed
    }

    /// Bytes held by live textures.
    pub fn resident_bytes(&self) -> usize {
        self.live.values().sum()
    }
}

impl GpuBackend for MemoryGpu {
    fn upload(&mut self, image: &RawImage) -> Result<TextureId, GpuError> {
        if self.fail_uploads > 0 {
            self.fail_uploads -= 1;
            return Err(GpuError::Upload("simulated upload failure".to_string()));
        }
        self.next_id += 1;
        let id = TextureId(self.next_id);
        self.live.insert(id, image.byte_len());
        self.uploads += 1;
        trace!(id = id.0, width = image.width(), height = image.height(), "Uploaded texture");
        Ok(id)
    }

    fn destroy(&mut self, id: TextureId) {
        if self.live.remove(&id).is_none() {
            warn!(id = id.0, "Destroying unknown texture");
            return;
        }
        self.destroyed.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_and_destroy_tracking() {
        let mut gpu = MemoryGpu::new();
        let a = gpu.upload(&RawImage::placeholder()).unwrap();
        let b = gpu.upload(&RawImage::solid(4, 4, [0; 4])).unwrap();
        assert_ne!(a, b);
        assert_eq!(gpu.live_count(), 2);
        assert_eq!(gpu.resident_bytes(), 16 + 64);

        gpu.destroy(a);
        assert!(!gpu.is_live(a));
        assert!(gpu.is_live(b));
        assert_eq!(gpu.destroyed(), &[a]);

        // Double destroy is ignored
        gpu.destroy(a);
        assert_eq!(gpu.destroyed().len(), 1);
    }

    #[test]
    fn test_simulated_failure() {
        let mut gpu = MemoryGpu::new();
        gpu.fail_next_uploads(1);
        assert!(gpu.upload(&RawImage::placeholder()).is_err());
        assert!(gpu.upload(&RawImage::placeholder()).is_ok());
        assert_eq!(gpu.upload_count(), 1);
    }
}
