//! Repeating frame callbacks
//!
//! A scheduled callback runs once per frame until it returns
//! [`FrameControl::Stop`] or its [`TickHandle`] is cancelled. Cancelling takes
//! effect immediately: no callback runs after `cancel()` returns.

use std::cell::Cell;
use std::rc::Rc;

/// What the frame callback wants next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Stop,
}

/// Called with the frame timestamp (ms)
pub type FrameCallback = Box<dyn FnMut(f64) -> FrameControl>;

/// Cancels a scheduled frame loop. Cloning shares the same loop.
#[derive(Debug, Clone, Default)]
pub struct TickHandle {
    cancelled: Rc<Cell<bool>>,
}

impl TickHandle {
    /// Stop future frames (idempotent)
    pub fn cancel(&self) {
        if !self.cancelled.replace(true) {
            log::debug!("Frame loop cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Source of per-frame callbacks
pub trait FrameScheduler {
    fn schedule(&mut self, callback: FrameCallback) -> TickHandle;
}

/// Delivers frames on demand at a fixed period (native loop, tests)
pub struct ManualScheduler {
    frame_ms: f64,
    now_ms: f64,
    active: Option<(FrameCallback, TickHandle)>,
}

impl ManualScheduler {
    pub fn new(frame_ms: f64) -> Self {
        Self {
            frame_ms,
            now_ms: 0.0,
            active: None,
        }
    }

    /// Timestamp of the last delivered frame
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|(_, handle)| !handle.is_cancelled())
    }

    /// Deliver up to `frames` frames. Returns how many callbacks ran.
    pub fn advance(&mut self, frames: u32) -> u32 {
        let mut delivered = 0;
        while delivered < frames {
            let Some((callback, handle)) = self.active.as_mut() else {
                break;
            };
            if handle.is_cancelled() {
                break;
            }
            self.now_ms += self.frame_ms;
            delivered += 1;
            if callback(self.now_ms) == FrameControl::Stop {
                handle.cancel();
            }
        }

        if !self.is_active() {
            self.active = None;
        }
        delivered
    }
}

impl FrameScheduler for ManualScheduler {
    /// Replaces (and cancels) any loop already scheduled
    fn schedule(&mut self, callback: FrameCallback) -> TickHandle {
        if let Some((_, previous)) = self.active.take() {
            previous.cancel();
        }
        let handle = TickHandle::default();
        self.active = Some((callback, handle.clone()));
        handle
    }
}

#[cfg(target_arch = "wasm32")]
pub use animation_frame::AnimationFrameScheduler;

#[cfg(target_arch = "wasm32")]
mod animation_frame {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    use super::{FrameCallback, FrameControl, FrameScheduler, TickHandle};

    /// `requestAnimationFrame` loop
    #[derive(Debug, Default)]
    pub struct AnimationFrameScheduler;

    fn request_frame(f: &Closure<dyn FnMut(f64)>) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.request_animation_frame(f.as_ref().unchecked_ref()) {
                log::error!("requestAnimationFrame failed: {:?}", e);
            }
        }
    }

    impl FrameScheduler for AnimationFrameScheduler {
        fn schedule(&mut self, mut callback: FrameCallback) -> TickHandle {
            let handle = TickHandle::default();
            let slot: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
            let next = slot.clone();
            let frame_handle = handle.clone();

            *slot.borrow_mut() = Some(Closure::new(move |time: f64| {
                if frame_handle.is_cancelled() {
                    return;
                }
                if callback(time) == FrameControl::Stop {
                    frame_handle.cancel();
                    return;
                }
                if let Some(f) = next.borrow().as_ref() {
                    request_frame(f);
                }
            }));

            if let Some(f) = slot.borrow().as_ref() {
                request_frame(f);
            }
            handle
        }
    }
}
