//! Spring physics animator
//!
//! Integrates a damped harmonic oscillator in normalized progress space
//! (0 toward 1) and maps progress through the interpolator, so numeric
//! overshoot extrapolates past the target and swings back.

use motive_core::{InterpolationHandle, Value};

use crate::animator::{Animator, Span};

/// Consecutive in-tolerance samples required before the spring counts as
/// settled. A single zero-crossing of the velocity near the target is not
/// enough to end an oscillation that still has energy.
const REST_SAMPLES: u32 = 3;

/// Integration substep, seconds. Keeps the explicit integration stable at
/// display-rate deltas and stiff configurations alike.
const MAX_STEP: f64 = 1.0 / 240.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringOptions {
    /// Spring constant pulling progress toward the target.
    pub tension: f64,
    /// Velocity-proportional damping.
    pub friction: f64,
    /// Initial velocity, progress units per second.
    pub velocity: f64,
    /// Displacement and velocity band counted as at rest.
    pub tolerance: f64,
}

impl Default for SpringOptions {
    fn default() -> Self {
        Self {
            tension: 500.0,
            friction: 10.0,
            velocity: 0.0,
            tolerance: 1e-4,
        }
    }
}

pub struct SpringAnimator {
    options: SpringOptions,
    span: Span,
    position: f64,
    velocity: f64,
    rest_streak: u32,
    finished: bool,
}

impl SpringAnimator {
    pub fn new(options: SpringOptions, interpolation: InterpolationHandle) -> Self {
        Self {
            velocity: options.velocity,
            options,
            span: Span::new(interpolation),
            position: 0.0,
            rest_streak: 0,
            finished: false,
        }
    }

    fn integrate(&mut self, delta: f64) {
        let mut remaining = delta.max(0.0);
        while remaining > 0.0 {
            let step = remaining.min(MAX_STEP);
            let displacement = self.position - 1.0;
            let acceleration =
                -self.options.tension * displacement - self.options.friction * self.velocity;
            // Semi-implicit Euler: velocity first, then position.
            self.velocity += acceleration * step;
            self.position += self.velocity * step;
            remaining -= step;
        }
    }
}

impl Animator for SpringAnimator {
    fn set_from(&mut self, value: Value) {
        self.span.set_from(value);
    }

    fn set_to(&mut self, value: Value) {
        self.span.set_to(value);
    }

    fn is_ready(&self) -> bool {
        self.span.is_ready()
    }

    fn next(&mut self, delta: f64) -> Value {
        self.integrate(delta);

        let at_rest = (self.position - 1.0).abs() < self.options.tolerance
            && self.velocity.abs() < self.options.tolerance;
        if at_rest {
            self.rest_streak += 1;
        } else {
            self.rest_streak = 0;
        }
        if self.rest_streak >= REST_SAMPLES {
            self.finished = true;
            let sampled = self.span.sample(1.0);
            return self.span.end_value().unwrap_or(sampled);
        }
        self.span.sample(self.position)
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn end_value(&self) -> Option<Value> {
        self.span.end_value()
    }
}
