//! imagura - image viewer core.
//!
//! Decoding runs on a worker pool; everything else (textures, caches,
//! animations, view state) lives on one UI thread inside [`Viewer`].

pub mod anim;
pub mod clock;
pub mod config;
pub mod decode;
pub mod error;
pub mod gpu;
pub mod images;
pub mod loader;
pub mod thumbnails;
pub mod view;
pub mod viewer;

pub use config::ViewerConfig;
pub use viewer::{Frame, Layer, Viewer};
