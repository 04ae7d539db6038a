//! Time-based animations coordinated with the decode pipeline.

pub mod easing;
pub mod orchestrator;
pub mod switch_queue;
pub mod tween;

pub use orchestrator::{Finished, Orchestrator};
pub use switch_queue::{SwitchQueue, SwitchRequest};
pub use tween::{
    Direction, OpenAnim, OpenSample, SwitchAnim, SwitchPhase, SwitchSample, ToggleZoomAnim,
    Tween, ZoomAnim,
};
