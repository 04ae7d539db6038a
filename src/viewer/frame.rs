use crate::gpu::TextureHandle;
use crate::view::ViewTransform;

/// One texture to draw at a transform and opacity.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub texture: TextureHandle,
    pub view: ViewTransform,
    pub alpha: f64,
}

/// Everything the renderer needs for one frame, already interpolated.
/// Layers are in draw order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub layers: Vec<Layer>,
    pub background_opacity: f64,
    pub loading_indicator: bool,
}
