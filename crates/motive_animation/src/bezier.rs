//! Cubic-bezier easing animator
//!
//! Eases progress along a cubic bezier curve over a fixed duration. The
//! output range comes entirely from the interpolator, so range and
//! duration vary independently.

use motive_core::{InterpolationHandle, Value};

use crate::animator::{Animator, Span};

/// Easing curve: a named preset or four control numbers
/// `[x1, y1, x2, y2]` as in CSS `cubic-bezier`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Curve {
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    Points([f64; 4]),
}

impl Default for Curve {
    fn default() -> Self {
        Self::Ease
    }
}

impl Curve {
    pub fn control_points(self) -> [f64; 4] {
        match self {
            Self::Linear => [0.0, 0.0, 1.0, 1.0],
            Self::Ease => [0.25, 0.1, 0.25, 1.0],
            Self::EaseIn => [0.42, 0.0, 1.0, 1.0],
            Self::EaseOut => [0.0, 0.0, 0.58, 1.0],
            Self::EaseInOut => [0.42, 0.0, 0.58, 1.0],
            Self::Points(points) => points,
        }
    }

    /// Eased progress for a time fraction in 0..1.
    pub fn ease(self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        let [x1, y1, x2, y2] = self.control_points();
        let t = solve_curve_x(x, x1, x2);
        bezier_sample(t, y1, y2)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BezierOptions {
    pub curve: Curve,
    /// Seconds of playout.
    pub duration: f64,
}

impl Default for BezierOptions {
    fn default() -> Self {
        Self {
            curve: Curve::default(),
            duration: 1.0,
        }
    }
}

pub struct BezierAnimator {
    options: BezierOptions,
    span: Span,
    elapsed: f64,
    finished: bool,
}

impl BezierAnimator {
    pub fn new(options: BezierOptions, interpolation: InterpolationHandle) -> Self {
        Self {
            options,
            span: Span::new(interpolation),
            elapsed: 0.0,
            finished: false,
        }
    }
}

impl Animator for BezierAnimator {
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
        self.elapsed += delta.max(0.0);
        let duration = self.options.duration.max(f64::EPSILON);
        if self.elapsed >= duration {
            self.finished = true;
            // The endpoint is returned exactly, not resampled.
            let sampled = self.span.sample(1.0);
            return self.span.end_value().unwrap_or(sampled);
        }
        let eased = self.options.curve.ease(self.elapsed / duration);
        self.span.sample(eased)
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn end_value(&self) -> Option<Value> {
        self.span.end_value()
    }
}

/// Solve the bezier's x(t) = x for t. Newton-Raphson with a bisection
/// fallback when the slope is too flat to trust.
fn solve_curve_x(x: f64, x1: f64, x2: f64) -> f64 {
    const TOLERANCE: f64 = 1e-7;

    let mut t = x;
    for _ in 0..8 {
        let err = bezier_sample(t, x1, x2) - x;
        if err.abs() < TOLERANCE {
            return t;
        }
        let slope = bezier_slope(t, x1, x2);
        if slope.abs() < TOLERANCE {
            break;
        }
        t -= err / slope;
    }

    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    t = x;
    for _ in 0..32 {
        let sampled = bezier_sample(t, x1, x2);
        if (sampled - x).abs() < TOLERANCE {
            break;
        }
        if sampled < x {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) * 0.5;
    }
    t
}

/// Evaluate the one-dimensional cubic bezier with endpoints pinned at 0
/// and 1, in Horner form.
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}
