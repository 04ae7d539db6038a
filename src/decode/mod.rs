//! Pixel decoding collaborators.
//!
//! - `Decoder` - pluggable `path -> RawImage` function run on worker threads
//! - `ImageDecoder` - default implementation backed by the `image` crate
//! - `ImageProbe` - cheap heavy-image classification before a decode starts

pub mod probe;
pub mod raw;

use std::io::Cursor;
use std::path::Path;

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageFormat};
use tracing::trace;

use crate::error::DecodeError;

pub use probe::{FileProbe, ImageProbe};
pub use raw::RawImage;

/// Turns a file into RGBA pixels. Called from decode workers only.
pub trait Decoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<RawImage, DecodeError>;
}

/// Decoder backed by the `image` crate. Animated GIFs yield their first frame.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    max_file_bytes: u64,
}

impl ImageDecoder {
    pub fn new(max_file_bytes: u64) -> Self {
        Self { max_file_bytes }
    }
}

impl Decoder for ImageDecoder {
    fn decode(&self, path: &Path) -> Result<RawImage, DecodeError> {
        let size = std::fs::metadata(path)
            .map_err(|source| DecodeError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        if size > self.max_file_bytes {
            return Err(DecodeError::TooLarge {
                path: path.to_path_buf(),
                size,
            });
        }

        let bytes = std::fs::read(path).map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image_err = |source| DecodeError::Image {
            path: path.to_path_buf(),
            source,
        };

        let format = image::guess_format(&bytes).ok();
        let rgba = if format == Some(ImageFormat::Gif) {
            let decoder = GifDecoder::new(Cursor::new(bytes)).map_err(image_err)?;
            let frame = decoder
                .into_frames()
                .next()
                .ok_or_else(|| DecodeError::NoFrames {
                    path: path.to_path_buf(),
                })?
                .map_err(image_err)?;
            frame.into_buffer()
        } else {
            let img = match format {
                Some(fmt) => image::load_from_memory_with_format(&bytes, fmt),
                None => image::load_from_memory(&bytes),
            }
            .map_err(image_err)?;
            img.into_rgba8()
        };

        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(DecodeError::Empty {
                path: path.to_path_buf(),
            });
        }
        trace!(?path, width, height, "Decoded image");
        Ok(RawImage::new(width, height, rgba.into_raw()))
    }
}
