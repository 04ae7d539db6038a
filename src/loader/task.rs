use std::cmp::Ordering;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::decode::RawImage;
use crate::error::DecodeError;

/// Decode priority. Lower variants are picked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// The image on screen (or about to be).
    Current = 0,
    /// Previous/next images for instant switching.
    Neighbor = 1,
    /// Gallery thumbnails.
    Gallery = 2,
}

/// Result of one decode, handed back to the UI thread.
#[derive(Debug)]
pub struct Completion {
    pub path: PathBuf,
    pub priority: Priority,
    pub result: Result<RawImage, DecodeError>,
    /// Time from submission to the end of decoding.
    pub elapsed: Duration,
}

/// Main-thread continuation for a finished decode. `C` is the context the
/// callback mutates (the viewer); it never leaves the UI thread.
pub type Callback<C> = Box<dyn FnOnce(&mut C, Completion) -> anyhow::Result<()> + Send>;

/// Box a closure as a [`Callback`].
pub fn callback<C, F>(f: F) -> Callback<C>
where
    F: FnOnce(&mut C, Completion) -> anyhow::Result<()> + Send + 'static,
{
    Box::new(f)
}

/// A queued decode request.
pub struct LoadTask<C> {
    pub path: PathBuf,
    pub priority: Priority,
    /// Downscale to this height after decoding (thumbnails).
    pub resize_height: Option<u32>,
    pub submitted: Instant,
    /// Submission order; ties within a priority class are broken FIFO.
    pub(crate) seq: u64,
    pub(crate) callback: Callback<C>,
}

impl<C> LoadTask<C> {
    pub fn new(
        path: PathBuf,
        priority: Priority,
        resize_height: Option<u32>,
        callback: Callback<C>,
    ) -> Self {
        Self {
            path,
            priority,
            resize_height,
            submitted: Instant::now(),
            seq: 0,
            callback,
        }
    }
}

impl<C> std::fmt::Debug for LoadTask<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadTask")
            .field("path", &self.path)
            .field("priority", &self.priority)
            .field("resize_height", &self.resize_height)
            .field("seq", &self.seq)
            .finish()
    }
}

impl<C> PartialEq for LoadTask<C> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<C> Eq for LoadTask<C> {}

impl<C> PartialOrd for LoadTask<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C> Ord for LoadTask<C> {
    /// Reversed so a max-heap yields the most urgent, oldest task first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
