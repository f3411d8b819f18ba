//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame scheduling (requestAnimationFrame on web, on-demand frames natively)
//! - Wall-clock time

pub mod scheduler;
pub mod time;

pub use scheduler::{FrameCallback, FrameControl, FrameScheduler, ManualScheduler, TickHandle};
pub use time::now_millis;

#[cfg(target_arch = "wasm32")]
pub use scheduler::AnimationFrameScheduler;
