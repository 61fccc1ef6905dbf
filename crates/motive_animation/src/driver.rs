//! Animation drivers
//!
//! A driver schedules repeated ticks against an animator and commits each
//! sample through a bound update sink. State machine:
//! `Idle -> Running -> {Finished | Cancelled}`, terminal states absorbing.
//! The termination flag is checked before any pending tick acts, so a
//! cancelled driver never calls the animator again.

use std::time::Instant;

use motive_core::Value;

use crate::animator::Animator;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Finished,
    Cancelled,
}

impl DriverState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }
}

/// Callback the driver writes each sampled value through.
pub type UpdateSink = Box<dyn FnMut(Value)>;

/// The per-tick machinery shared by every driver: one animator, one sink,
/// one state flag, and an optional completion hook.
pub struct DriverCore {
    animator: Box<dyn Animator>,
    sink: UpdateSink,
    state: DriverState,
    on_finish: Option<Box<dyn FnOnce()>>,
}

impl DriverCore {
    pub fn new(animator: Box<dyn Animator>, sink: UpdateSink) -> Self {
        Self {
            animator,
            sink,
            state: DriverState::Idle,
            on_finish: None,
        }
    }

    /// Hook invoked exactly once when the driver reaches Finished.
    pub fn set_on_finish(&mut self, f: impl FnOnce() + 'static) {
        self.on_finish = Some(Box::new(f));
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn start(&mut self) {
        if self.state == DriverState::Idle {
            self.state = DriverState::Running;
        }
    }

    /// One scheduling tick: exactly one `next` call, or the finish write
    /// once the animator reports done.
    pub fn tick(&mut self, delta: f64) {
        if self.state != DriverState::Running {
            return;
        }
        if self.animator.is_finished() {
            self.finish();
            return;
        }
        if self.animator.is_ready() {
            let value = self.animator.next(delta);
            (self.sink)(value);
        }
    }

    /// Force completion: write the animator's defined end value and stop.
    /// Idempotent; does nothing from a terminal state.
    pub fn finish(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        if let Some(end) = self.animator.end_value() {
            (self.sink)(end);
        }
        self.state = DriverState::Finished;
        if let Some(hook) = self.on_finish.take() {
            hook();
        }
    }

    /// Stop without writing a final value.
    pub fn cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.state = DriverState::Cancelled;
    }
}

/// Scheduling strategy wrapped around a `DriverCore`.
pub trait Driver {
    fn play(&mut self);

    fn cancel(&mut self);

    fn finish(&mut self);

    fn state(&self) -> DriverState;

    /// Advance one scheduling step. Real-time drivers are pumped by the
    /// host's frame loop; deterministic drivers advance a fixed timestep.
    fn tick(&mut self);
}

/// Real-time driver: the host calls `tick` once per display frame and the
/// delta is measured wall time between calls.
pub struct FrameDriver {
    core: DriverCore,
    last_tick: Option<Instant>,
}

impl FrameDriver {
    pub fn new(core: DriverCore) -> Self {
        Self {
            core,
            last_tick: None,
        }
    }
}

impl Driver for FrameDriver {
    fn play(&mut self) {
        self.core.start();
        self.last_tick = Some(Instant::now());
    }

    fn cancel(&mut self) {
        self.core.cancel();
    }

    fn finish(&mut self) {
        self.core.finish();
    }

    fn state(&self) -> DriverState {
        self.core.state()
    }

    fn tick(&mut self) {
        if self.core.state() != DriverState::Running {
            return;
        }
        let now = Instant::now();
        let delta = match self.last_tick.replace(now) {
            Some(previous) => (now - previous).as_secs_f64(),
            None => 0.0,
        };
        self.core.tick(delta);
    }
}

/// Nominal timestep for the deterministic drivers.
pub const TEST_TIMESTEP: f64 = 1.0 / 16.0;

/// Deterministic driver that plays the whole animation synchronously in a
/// tight loop at a fixed timestep. Useful for exhaustive sampling.
pub struct SyncTestDriver {
    core: DriverCore,
    timestep: f64,
}

impl SyncTestDriver {
    pub fn new(core: DriverCore) -> Self {
        Self::with_timestep(core, TEST_TIMESTEP)
    }

    pub fn with_timestep(core: DriverCore, timestep: f64) -> Self {
        Self { core, timestep }
    }
}

impl Driver for SyncTestDriver {
    fn play(&mut self) {
        self.core.start();
        while self.core.state() == DriverState::Running {
            self.core.tick(self.timestep);
        }
    }

    fn cancel(&mut self) {
        self.core.cancel();
    }

    fn finish(&mut self) {
        self.core.finish();
    }

    fn state(&self) -> DriverState {
        self.core.state()
    }

    fn tick(&mut self) {
        self.core.tick(self.timestep);
    }
}

/// Deterministic driver advanced one fixed tick at a time by the host.
/// Useful for asynchronous completion-ordering tests.
pub struct SteppedTestDriver {
    core: DriverCore,
    timestep: f64,
}

impl SteppedTestDriver {
    pub fn new(core: DriverCore) -> Self {
        Self {
            core,
            timestep: TEST_TIMESTEP,
        }
    }

    /// Advance one tick; true while still running.
    pub fn step(&mut self) -> bool {
        self.core.tick(self.timestep);
        self.core.state() == DriverState::Running
    }
}

impl Driver for SteppedTestDriver {
    fn play(&mut self) {
        self.core.start();
    }

    fn cancel(&mut self) {
        self.core.cancel();
    }

    fn finish(&mut self) {
        self.core.finish();
    }

    fn state(&self) -> DriverState {
        self.core.state()
    }

    fn tick(&mut self) {
        self.step();
    }
}
