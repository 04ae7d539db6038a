//! Image list and the prefetch window over it.

pub mod cache;
pub mod list;

pub use cache::{ImageCache, Slot};
pub use list::{is_supported, ImageList, SUPPORTED_EXTENSIONS};
