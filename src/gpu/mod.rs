//! GPU collaborator boundary.
//!
//! Every call into a [`GpuBackend`] happens on the thread that owns the
//! viewer. Textures are never destroyed inline; retired handles go through
//! the [`UnloadQueue`] and are freed at a safe point in the frame.

pub mod memory;
pub mod unload;

use std::path::{Path, PathBuf};

use crate::decode::RawImage;
use crate::error::GpuError;

pub use memory::MemoryGpu;
pub use unload::UnloadQueue;

/// Backend-assigned texture identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// An uploaded texture and the image it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureHandle {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
    pub path: PathBuf,
}

impl TextureHandle {
    pub fn dimensions(&self) -> (f64, f64) {
        (self.width as f64, self.height as f64)
    }

    pub fn is_for(&self, path: &Path) -> bool {
        self.path == path
    }
}

pub trait GpuBackend {
    fn upload(&mut self, image: &RawImage) -> Result<TextureId, GpuError>;
    fn destroy(&mut self, id: TextureId);
}

/// Upload `image` and wrap the result in a handle tagged with `path`.
pub fn upload_texture<G: GpuBackend + ?Sized>(
    gpu: &mut G,
    image: &RawImage,
    path: &Path,
) -> Result<TextureHandle, GpuError> {
    let id = gpu.upload(image)?;
    Ok(TextureHandle {
        id,
        width: image.width(),
        height: image.height(),
        path: path.to_path_buf(),
    })
}
