//! View transforms, zoom classification and per-path view memory.

pub mod math;
pub mod memory;
pub mod state;

pub use math::{
    anchor_zoom, center_view, clamp_pan, fit_scale, fit_view, lerp_view, one_to_one_view,
    sanitize_view, Size, ViewTransform,
};
pub use memory::ViewMemory;
pub use state::{ViewState, ZoomMode};
