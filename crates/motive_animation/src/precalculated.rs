//! Precalculated trajectory playback
//!
//! Wraps a delegate animator, runs it to exhaustion once at a fixed
//! internal delta, and replays the stored samples. Playback looks up by
//! round-to-nearest index, so it can run at a different frame rate than
//! the trajectory was computed at.

use motive_core::Value;

use crate::animator::Animator;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrecalculatedOptions {
    /// Internal sampling delta, seconds.
    pub delta: f64,
    /// Cap on stored samples; a delegate that never finishes is cut off.
    pub max_values: usize,
}

impl Default for PrecalculatedOptions {
    fn default() -> Self {
        Self {
            delta: 1.0 / 60.0,
            max_values: 600,
        }
    }
}

pub struct PrecalculatedAnimator {
    delegate: Box<dyn Animator>,
    options: PrecalculatedOptions,
    values: Vec<Value>,
    elapsed: f64,
    calculated: bool,
}

impl PrecalculatedAnimator {
    pub fn new(options: PrecalculatedOptions, delegate: Box<dyn Animator>) -> Self {
        Self {
            delegate,
            options,
            values: Vec::new(),
            elapsed: 0.0,
            calculated: false,
        }
    }

    fn precalculate_if_ready(&mut self) {
        if self.calculated || !self.delegate.is_ready() {
            return;
        }
        self.calculated = true;
        while !self.delegate.is_finished() && self.values.len() < self.options.max_values {
            self.values.push(self.delegate.next(self.options.delta));
        }
    }

    /// Nearest precomputed sample for the accumulated playback time.
    fn index_for(&self, elapsed: f64) -> usize {
        (elapsed / self.options.delta).round() as usize
    }
}

impl Animator for PrecalculatedAnimator {
    fn set_from(&mut self, value: Value) {
        if self.calculated {
            return;
        }
        self.delegate.set_from(value);
        self.precalculate_if_ready();
    }

    fn set_to(&mut self, value: Value) {
        if self.calculated {
            return;
        }
        self.delegate.set_to(value);
        self.precalculate_if_ready();
    }

    fn is_ready(&self) -> bool {
        self.calculated
    }

    fn next(&mut self, delta: f64) -> Value {
        self.elapsed += delta.max(0.0);
        if self.values.is_empty() {
            return self.delegate.end_value().unwrap_or(Value::Number(0.0));
        }
        let nearest = self.index_for(self.elapsed);
        let index = nearest.saturating_sub(1).min(self.values.len() - 1);
        self.values[index].clone()
    }

    fn is_finished(&self) -> bool {
        if !self.calculated {
            return false;
        }
        self.index_for(self.elapsed) >= self.values.len()
    }

    fn end_value(&self) -> Option<Value> {
        self.delegate.end_value()
    }
}
