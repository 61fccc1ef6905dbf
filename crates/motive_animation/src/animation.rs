//! Animation orchestration
//!
//! Binds one observable target, one animator, and one driver into a
//! controllable animation with a cached completion signal. All writes go
//! through the target's own `set`, so observable invariants hold whether
//! a change comes from the animation or from direct mutation.

use std::cell::RefCell;
use std::rc::Rc;

use motive_core::{
    any, Animatable, Completion, CompletionResult, DeferredQueue, InterpolationHandle, Value,
};

use crate::animator::Animator;
use crate::driver::{Driver, DriverCore, DriverState};
use crate::precalculated::{PrecalculatedAnimator, PrecalculatedOptions};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimationOptions {
    /// Pre-sample the whole trajectory once and replay it, trading memory
    /// for cheap variable-rate playback.
    pub precalculate: bool,
}

type FinishSlot = Rc<RefCell<Option<Box<dyn FnMut()>>>>;

/// One controllable animation run.
///
/// Reaches a terminal state exactly once: the completion signal resolves
/// on natural playout or a forced `finish`, and rejects on `cancel`.
/// Completion waiters are delivered through the deferred queue, never
/// from inside the control call that settled the state.
pub struct Animation {
    driver: Box<dyn Driver>,
    completion: Completion,
    on_finish: FinishSlot,
}

impl Animation {
    /// Wire up a run. The animator factory receives the generic value
    /// interpolation; the driver factory receives the bound core.
    pub fn new(
        target: &Animatable<Value>,
        from: Value,
        to: Value,
        animator: impl FnOnce(InterpolationHandle) -> Box<dyn Animator>,
        driver: impl FnOnce(DriverCore) -> Box<dyn Driver>,
        options: AnimationOptions,
        queue: &DeferredQueue,
    ) -> Self {
        let mut animator = animator(any());
        if options.precalculate {
            animator = Box::new(PrecalculatedAnimator::new(
                PrecalculatedOptions::default(),
                animator,
            ));
        }
        animator.set_from(from);
        animator.set_to(to);

        let sink_target = target.clone();
        let mut core = DriverCore::new(
            animator,
            Box::new(move |value| sink_target.set(value)),
        );

        let completion = Completion::new(queue);
        let on_finish: FinishSlot = Rc::new(RefCell::new(None));
        let hook_completion = completion.clone();
        let hook_slot = on_finish.clone();
        core.set_on_finish(move || {
            tracing::trace!("animation finished");
            if let Some(callback) = hook_slot.borrow_mut().as_mut() {
                callback();
            }
            hook_completion.resolve();
        });

        Self {
            driver: driver(core),
            completion,
            on_finish,
        }
    }

    pub fn play(&mut self) {
        tracing::trace!("animation playing");
        self.driver.play();
    }

    /// Halt without a final write and reject the completion signal.
    /// No-op once terminal.
    pub fn cancel(&mut self) {
        if self.driver.state().is_terminal() {
            return;
        }
        self.driver.cancel();
        tracing::trace!("animation cancelled");
        self.completion.reject();
    }

    /// Force completion: the target receives the animator's defined end
    /// value and the completion signal resolves. Idempotent.
    pub fn finish(&mut self) {
        self.driver.finish();
    }

    /// Advance the underlying driver one scheduling step. Real-time hosts
    /// call this once per frame.
    pub fn tick(&mut self) {
        self.driver.tick();
    }

    pub fn state(&self) -> DriverState {
        self.driver.state()
    }

    /// The cached completion signal for this run.
    pub fn completion(&self) -> Completion {
        self.completion.clone()
    }

    /// Register a completion waiter; sugar over `completion()`.
    pub fn on_finished(&self, f: impl FnOnce(CompletionResult) + 'static) {
        self.completion.on_settled(f);
    }

    /// Completion-notification slot. Fires when the run finishes; setting
    /// it after the run already finished does not fire retroactively.
    pub fn set_on_finish(&mut self, f: impl FnMut() + 'static) {
        *self.on_finish.borrow_mut() = Some(Box::new(f));
    }
}
