use tracing::trace;

use super::{GpuBackend, TextureHandle};

/// Retired textures waiting to be destroyed on the owning thread.
#[derive(Debug, Default)]
pub struct UnloadQueue {
    pending: Vec<TextureHandle>,
}

impl UnloadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a texture for destruction. A handle already queued is ignored.
    pub fn defer(&mut self, texture: TextureHandle) {
        if self.pending.iter().any(|t| t.id == texture.id) {
            return;
        }
        self.pending.push(texture);
    }

    pub fn defer_opt(&mut self, texture: Option<TextureHandle>) {
        if let Some(texture) = texture {
            self.defer(texture);
        }
    }

    pub fn defer_all(&mut self, textures: impl IntoIterator<Item = TextureHandle>) {
        for texture in textures {
            self.defer(texture);
        }
    }

    /// Destroy everything queued. Returns the number of textures freed.
    pub fn flush<G: GpuBackend + ?Sized>(&mut self, gpu: &mut G) -> usize {
        let count = self.pending.len();
        for texture in self.pending.drain(..) {
            gpu.destroy(texture.id);
        }
        if count > 0 {
            trace!(count, "Flushed deferred texture unloads");
        }
        count
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
