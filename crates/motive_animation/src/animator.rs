//! Animator contract
//!
//! An animator maps elapsed time to sampled values between two endpoints.
//! Instances move through `Ready -> Animating -> Finished`: endpoints may
//! be adjusted until the first sample, then the run is locked.

use motive_core::{InterpolationHandle, Interpolator, Value};

pub trait Animator {
    /// Set the starting endpoint. Ignored once sampling has started.
    fn set_from(&mut self, value: Value);

    /// Set the target endpoint. Ignored once sampling has started.
    fn set_to(&mut self, value: Value);

    /// True once both endpoints are in place.
    fn is_ready(&self) -> bool;

    /// Advance by `delta` seconds and return the sampled value. Not
    /// meaningful after `is_finished` reports true.
    fn next(&mut self, delta: f64) -> Value;

    fn is_finished(&self) -> bool;

    /// The defined end value, written by a forced finish. Not necessarily
    /// the last sampled value.
    fn end_value(&self) -> Option<Value>;
}

/// Endpoint pair plus the lazily built interpolator shared by the curve
/// animators. Locks the endpoints once the first sample is taken.
pub(crate) struct Span {
    from: Option<Value>,
    to: Option<Value>,
    interpolation: InterpolationHandle,
    interpolator: Option<Interpolator>,
    started: bool,
}

impl Span {
    pub(crate) fn new(interpolation: InterpolationHandle) -> Self {
        Self {
            from: None,
            to: None,
            interpolation,
            interpolator: None,
            started: false,
        }
    }

    pub(crate) fn set_from(&mut self, value: Value) {
        if self.started {
            tracing::debug!("ignoring set_from on a started animator");
            return;
        }
        self.from = Some(value);
        self.interpolator = None;
    }

    pub(crate) fn set_to(&mut self, value: Value) {
        if self.started {
            tracing::debug!("ignoring set_to on a started animator");
            return;
        }
        self.to = Some(value);
        self.interpolator = None;
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }

    pub(crate) fn end_value(&self) -> Option<Value> {
        self.to.clone()
    }

    /// Sample at an eased progress. Falls back to whichever endpoint is
    /// present when called before the span is ready.
    pub(crate) fn sample(&mut self, progress: f64) -> Value {
        let (from, to) = match (&self.from, &self.to) {
            (Some(from), Some(to)) => (from.clone(), to.clone()),
            _ => {
                return self
                    .from
                    .clone()
                    .or_else(|| self.to.clone())
                    .unwrap_or(Value::Number(0.0))
            }
        };
        self.started = true;
        if self.interpolator.is_none() {
            self.interpolator = Some(self.interpolation.interpolate(&from, &to));
        }
        match &self.interpolator {
            Some(interpolator) => interpolator(progress),
            None => to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motive_core::any;

    #[test]
    fn test_span_locks_endpoints_after_first_sample() {
        let mut span = Span::new(any());
        span.set_from(Value::Number(0.0));
        span.set_to(Value::Number(10.0));
        assert_eq!(span.sample(0.5), Value::Number(5.0));

        span.set_to(Value::Number(100.0));
        assert_eq!(span.sample(0.5), Value::Number(5.0));
        assert_eq!(span.end_value(), Some(Value::Number(10.0)));
    }

    #[test]
    fn test_span_is_ready_only_with_both_endpoints() {
        let mut span = Span::new(any());
        assert!(!span.is_ready());
        span.set_from(Value::Number(1.0));
        assert!(!span.is_ready());
        span.set_to(Value::Number(2.0));
        assert!(span.is_ready());
    }
}
