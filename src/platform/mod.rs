//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame scheduling (requestAnimationFrame on web, manual stepping elsewhere)
//! - Keyboard mapping to controller actions

use crate::sim::Action;

/// Identifies one requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host primitive that calls the driver back once per display refresh
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    /// Cancelling an unknown or already-fired handle does nothing
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler stepped by hand, for tests and headless runs
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    pending: Option<FrameHandle>,
    pub requested: u32,
    pub cancelled: u32,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently requested frame that was not cancelled
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        self.requested += 1;
        let handle = FrameHandle(self.next);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{FrameCallback, RafScheduler};

#[cfg(target_arch = "wasm32")]
mod web {
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;

    use super::{FrameHandle, FrameScheduler};

    pub type FrameCallback = Rc<dyn Fn(FrameHandle, f64)>;

    /// `requestAnimationFrame`-backed scheduler
    pub struct RafScheduler {
        on_frame: FrameCallback,
        next: u64,
        /// Our handle and the browser's request id
        pending: Option<(FrameHandle, i32)>,
    }

    impl RafScheduler {
        pub fn new(on_frame: FrameCallback) -> Self {
            Self {
                on_frame,
                next: 0,
                pending: None,
            }
        }
    }

    impl FrameScheduler for RafScheduler {
        fn request_frame(&mut self) -> FrameHandle {
            self.next += 1;
            let handle = FrameHandle(self.next);
            let on_frame = self.on_frame.clone();
            let closure = Closure::once(move |time: f64| on_frame(handle, time));

            match web_sys::window()
                .map(|w| w.request_animation_frame(closure.as_ref().unchecked_ref()))
            {
                Some(Ok(id)) => self.pending = Some((handle, id)),
                _ => log::error!("requestAnimationFrame unavailable"),
            }
            closure.forget();
            handle
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            let Some((pending, id)) = self.pending else {
                return;
            };
            if pending != handle {
                return;
            }
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
            self.pending = None;
        }
    }
}

/// Map a `KeyboardEvent.code` to a controller action
pub fn key_action(code: &str, pressed: bool) -> Option<Action> {
    let action = match (code, pressed) {
        ("ArrowUp" | "KeyW", true) => Action::StartJump,
        ("ArrowUp" | "KeyW", false) => Action::StopJump,
        ("ArrowRight" | "KeyD", true) => Action::StartMoveRight,
        ("ArrowRight" | "KeyD", false) => Action::StopMoveRight,
        ("ArrowLeft" | "KeyA", true) => Action::StartMoveLeft,
        ("ArrowLeft" | "KeyA", false) => Action::StopMoveLeft,
        _ => return None,
    };
    Some(action)
}
