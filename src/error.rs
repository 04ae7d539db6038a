use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a file into pixels. Produced on worker threads and
/// delivered to the UI thread as a value.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image {path:?} has empty dimensions")]
    Empty { path: PathBuf },
    #[error("image {path:?} is too large ({size} bytes)")]
    TooLarge { path: PathBuf, size: u64 },
    #[error("animated image {path:?} has no frames")]
    NoFrames { path: PathBuf },
    #[error("decoder panicked on {path:?}")]
    Panicked { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("texture upload failed: {0}")]
    Upload(String),
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to spawn decode worker: {0}")]
    Spawn(#[from] std::io::Error),
}
