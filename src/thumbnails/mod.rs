//! Gallery strip thumbnails.
//!
//! - `ThumbnailCache` - bounded cache with a schedule queue, drained a few
//!   entries per frame into GALLERY-priority decodes

pub mod cache;

pub use cache::{ProcessOutcome, ThumbnailCache, ThumbnailEntry, ThumbnailState};
