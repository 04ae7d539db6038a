use image::imageops::FilterType;
use image::RgbaImage;

/// Decoded RGBA8 pixels, produced off the UI thread and consumed by a GPU upload.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RawImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// A single-colour image.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::new(width, height, pixels)
    }

    /// The tiny stand-in shown when the current image cannot be decoded.
    pub fn placeholder() -> Self {
        Self::solid(2, 2, [255, 255, 255, 255])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }

    /// Resize in place to exactly `width` x `height`.
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        if width == self.width && height == self.height {
            return;
        }
        let pixels = std::mem::take(&mut self.pixels);
        match RgbaImage::from_raw(self.width, self.height, pixels) {
            Some(buffer) => {
                let resized = image::imageops::resize(&buffer, width, height, FilterType::Triangle);
                self.width = width;
                self.height = height;
                self.pixels = resized.into_raw();
            }
            None => {
                // Buffer does not match its dimensions; fall back to a blank image.
                *self = Self::solid(width, height, [0, 0, 0, 0]);
            }
        }
    }

    /// Downscale so the larger side is at most `max_dim`. Returns true if resized.
    pub fn clamp_to(&mut self, max_dim: u32) -> bool {
        let longest = self.width.max(self.height);
        if longest <= max_dim || longest == 0 {
            return false;
        }
        let ratio = max_dim as f64 / longest as f64;
        let width = ((self.width as f64 * ratio).round() as u32).max(1);
        let height = ((self.height as f64 * ratio).round() as u32).max(1);
        self.resize(width, height);
        true
    }

    /// Downscale to `target_height`, keeping the aspect ratio. Never upscales.
    pub fn resize_to_height(&mut self, target_height: u32) {
        let (width, height) = thumbnail_dimensions(self.width, self.height, target_height);
        self.resize(width, height);
    }
}

/// Dimensions for a thumbnail of `target_height`, preserving aspect ratio.
pub fn thumbnail_dimensions(src_width: u32, src_height: u32, target_height: u32) -> (u32, u32) {
    if src_width == 0 || src_height == 0 {
        return (target_height.max(1), target_height.max(1));
    }
    let effective_height = target_height.max(1).min(src_height);
    let aspect_ratio = src_width as f64 / src_height as f64;
    let width = (effective_height as f64 * aspect_ratio).round() as u32;
    (width.max(1), effective_height)
}
