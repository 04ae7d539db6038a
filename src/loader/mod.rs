//! Asynchronous decode pipeline.
//!
//! UI thread --submit--> [TaskQueue] --pop--> workers --decode--> [flume] --poll--> UI thread

pub mod events;
pub mod pool;
pub mod queue;
pub mod task;

pub use events::{UiEvent, UiEventDrain};
pub use pool::DecodePool;
pub use queue::TaskQueue;
pub use task::{callback, Callback, Completion, LoadTask, Priority};
