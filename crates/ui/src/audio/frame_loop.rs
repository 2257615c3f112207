//! Cancellable per-frame task
//!
//! Runs a step once per display frame until cancelled. The active flag is
//! checked before the step and again before rescheduling, and cancelling
//! also withdraws the pending frame request, so no step runs after
//! `cancel` returns.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

pub type FrameHandle = i32;

/// Source of "next frame" callbacks
pub trait FrameScheduler {
    /// Run `tick` on the next frame; `None` if it could not be scheduled
    fn request(&self, tick: Box<dyn FnOnce()>) -> Option<FrameHandle>;
    fn cancel(&self, handle: FrameHandle);
}

/// `requestAnimationFrame`-backed scheduler
#[derive(Debug, Clone, Copy, Default)]
pub struct RafScheduler;

impl FrameScheduler for RafScheduler {
    fn request(&self, tick: Box<dyn FnOnce()>) -> Option<FrameHandle> {
        let win = web_sys::window()?;
        let callback = Closure::once_into_js(move || tick());
        match win.request_animation_frame(callback.unchecked_ref()) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %crate::error::describe_js(&e), "requestAnimationFrame failed");
                None
            }
        }
    }

    fn cancel(&self, handle: FrameHandle) {
        if let Some(win) = web_sys::window() {
            let _ = win.cancel_animation_frame(handle);
        }
    }
}

struct LoopState<S> {
    scheduler: S,
    active: Cell<bool>,
    pending: Cell<Option<FrameHandle>>,
    step: RefCell<Box<dyn FnMut()>>,
}

/// Handle to a running frame loop. Dropping it cancels the loop.
pub struct FrameLoop<S: FrameScheduler + 'static> {
    state: Rc<LoopState<S>>,
}

impl<S: FrameScheduler + 'static> FrameLoop<S> {
    /// Start running `step` on every frame, beginning with the next one
    pub fn start(scheduler: S, step: impl FnMut() + 'static) -> Self {
        let state = Rc::new(LoopState {
            scheduler,
            active: Cell::new(true),
            pending: Cell::new(None),
            step: RefCell::new(Box::new(step)),
        });
        schedule(&state);
        Self { state }
    }

    pub fn is_active(&self) -> bool {
        self.state.active.get()
    }

    pub fn cancel(&self) {
        self.state.active.set(false);
        if let Some(handle) = self.state.pending.take() {
            self.state.scheduler.cancel(handle);
        }
    }
}

impl<S: FrameScheduler + 'static> Drop for FrameLoop<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn schedule<S: FrameScheduler + 'static>(state: &Rc<LoopState<S>>) {
    let weak: Weak<LoopState<S>> = Rc::downgrade(state);
    let handle = state.scheduler.request(Box::new(move || {
        if let Some(state) = weak.upgrade() {
            tick(&state);
        }
    }));
    if handle.is_none() {
        tracing::warn!("Frame loop stopped: could not schedule next frame");
        state.active.set(false);
    }
    state.pending.set(handle);
}

fn tick<S: FrameScheduler + 'static>(state: &Rc<LoopState<S>>) {
    state.pending.set(None);
    if !state.active.get() {
        return;
    }
    (state.step.borrow_mut())();
    if state.active.get() {
        schedule(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualScheduler;

    fn counting_loop(scheduler: &ManualScheduler) -> (FrameLoop<ManualScheduler>, Rc<Cell<u32>>) {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let frames = FrameLoop::start(scheduler.clone(), move || counter.set(counter.get() + 1));
        (frames, count)
    }

    #[test]
    fn test_runs_once_per_frame() {
        let scheduler = ManualScheduler::default();
        let (frames, count) = counting_loop(&scheduler);

        assert_eq!(count.get(), 0, "first step waits for the next frame");
        scheduler.run_frame();
        scheduler.run_frame();
        scheduler.run_frame();
        assert_eq!(count.get(), 3);
        assert!(frames.is_active());
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_cancel_withdraws_pending_frame() {
        let scheduler = ManualScheduler::default();
        let (frames, count) = counting_loop(&scheduler);
        scheduler.run_frame();

        frames.cancel();
        assert_eq!(scheduler.pending(), 0);
        scheduler.run_frame();
        assert_eq!(count.get(), 1);
        assert!(!frames.is_active());
    }

    #[test]
    fn test_already_dispatched_frame_after_cancel_is_noop() {
        // Simulate a scheduler that cannot withdraw a frame already in flight
        let scheduler = ManualScheduler::ignoring_cancel();
        let (frames, count) = counting_loop(&scheduler);

        frames.cancel();
        scheduler.run_frame();
        assert_eq!(count.get(), 0);
        assert_eq!(scheduler.pending(), 0, "no reschedule after cancel");
    }

    #[test]
    fn test_cancel_from_inside_step_stops_rescheduling() {
        let scheduler = ManualScheduler::default();
        let slot: Rc<RefCell<Option<FrameLoop<ManualScheduler>>>> = Rc::new(RefCell::new(None));
        let count = Rc::new(Cell::new(0));

        let slot_in_step = slot.clone();
        let counter = count.clone();
        let frames = FrameLoop::start(scheduler.clone(), move || {
            counter.set(counter.get() + 1);
            if let Some(frames) = slot_in_step.borrow().as_ref() {
                frames.cancel();
            }
        });
        *slot.borrow_mut() = Some(frames);

        scheduler.run_frame();
        scheduler.run_frame();
        assert_eq!(count.get(), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_drop_cancels() {
        let scheduler = ManualScheduler::default();
        let (frames, count) = counting_loop(&scheduler);
        drop(frames);
        scheduler.run_frame();
        assert_eq!(count.get(), 0);
    }
}
