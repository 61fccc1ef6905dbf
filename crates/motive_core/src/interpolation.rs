//! Shape-polymorphic interpolation
//!
//! An `Interpolation` turns a pair of endpoint values into an interpolator
//! closure mapping progress to a sampled value. Progress is usually in
//! 0..1 but numeric interpolation extrapolates linearly outside it, which
//! spring overshoot depends on.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::color::{Color, ColorModel};
use crate::value::{Custom, Value, ValueMap};

/// Progress to value closure produced for one endpoint pair.
pub type Interpolator = Box<dyn Fn(f64) -> Value>;

/// Shared interpolation strategy.
pub type InterpolationHandle = Rc<dyn Interpolation>;

pub trait Interpolation: std::fmt::Debug {
    fn interpolate(&self, from: &Value, to: &Value) -> Interpolator;

    /// True only for the generic any-value dispatcher. Custom values are
    /// not allowed to answer the resolver with it (that would recurse
    /// without specializing), and the resolver checks this flag.
    fn is_generic(&self) -> bool {
        false
    }
}

/// Shared handle to the generic any-value dispatcher.
pub fn any() -> InterpolationHandle {
    Rc::new(ValueInterpolation::default())
}

/// Linear numeric interpolation, extrapolating outside 0..1.
#[derive(Clone, Copy, Debug, Default)]
pub struct NumberInterpolation;

impl Interpolation for NumberInterpolation {
    fn interpolate(&self, from: &Value, to: &Value) -> Interpolator {
        match (from.as_number(), to.as_number()) {
            (Some(a), Some(b)) => Box::new(move |progress| Value::Number(a + (b - a) * progress)),
            _ => NoInterpolation.interpolate(from, to),
        }
    }
}

/// Step interpolation: holds `from` until progress reaches 1.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInterpolation;

impl Interpolation for NoInterpolation {
    fn interpolate(&self, from: &Value, to: &Value) -> Interpolator {
        let from = from.clone();
        let to = to.clone();
        Box::new(move |progress| {
            if progress >= 1.0 {
                to.clone()
            } else {
                from.clone()
            }
        })
    }
}

/// Per-channel color interpolation in a selectable channel space.
#[derive(Clone, Copy, Debug, Default)]
pub struct ColorInterpolation {
    model: ColorModel,
}

impl ColorInterpolation {
    pub fn new(model: ColorModel) -> Self {
        Self { model }
    }
}

impl Interpolation for ColorInterpolation {
    fn interpolate(&self, from: &Value, to: &Value) -> Interpolator {
        match (coerce_color(from), coerce_color(to)) {
            (Some(a), Some(b)) => {
                let model = self.model;
                Box::new(move |progress| Value::Color(a.mix(&b, progress, model)))
            }
            _ => NoInterpolation.interpolate(from, to),
        }
    }
}

fn coerce_color(value: &Value) -> Option<Color> {
    match value {
        Value::Color(c) => Some(*c),
        Value::Text(s) => Color::parse(s).ok(),
        _ => None,
    }
}

/// Recursive per-key interpolation over the union of object keys.
///
/// A key present on only one side is held constant at that side's value,
/// so mismatched shapes degrade gracefully instead of failing.
#[derive(Debug)]
pub struct ObjectInterpolation {
    inner: InterpolationHandle,
}

impl ObjectInterpolation {
    pub fn new(inner: InterpolationHandle) -> Self {
        Self { inner }
    }
}

impl Interpolation for ObjectInterpolation {
    fn interpolate(&self, from: &Value, to: &Value) -> Interpolator {
        let (Some(from_map), Some(to_map)) = (from.as_object(), to.as_object()) else {
            return NoInterpolation.interpolate(from, to);
        };
        let mut fields: Vec<(String, Interpolator)> = Vec::new();
        for (key, from_field) in from_map {
            let interpolator = match to_map.get(key) {
                Some(to_field) => self.inner.interpolate(from_field, to_field),
                None => constant(from_field.clone()),
            };
            fields.push((key.clone(), interpolator));
        }
        for (key, to_field) in to_map {
            if !from_map.contains_key(key) {
                fields.push((key.clone(), constant(to_field.clone())));
            }
        }
        Box::new(move |progress| {
            Value::Object(
                fields
                    .iter()
                    .map(|(key, field)| (key.clone(), field(progress)))
                    .collect::<ValueMap>(),
            )
        })
    }
}

fn constant(value: Value) -> Interpolator {
    Box::new(move |_| value.clone())
}

/// The generic dispatcher: resolves a concrete strategy from the shape of
/// the endpoints, consulting the custom capability where present.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValueInterpolation {
    color_model: ColorModel,
}

impl ValueInterpolation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel space used when the endpoints turn out to be colors.
    pub fn with_color_model(color_model: ColorModel) -> Self {
        Self { color_model }
    }

    fn resolve(&self, value: &Value) -> InterpolationHandle {
        match value {
            Value::Number(_) => Rc::new(NumberInterpolation),
            Value::Bool(_) => Rc::new(NoInterpolation),
            Value::Color(_) => Rc::new(ColorInterpolation::new(self.color_model)),
            Value::Object(_) => Rc::new(ObjectInterpolation::new(Rc::new(*self))),
            Value::Text(s) => {
                if Color::parse(s).is_ok() {
                    Rc::new(ColorInterpolation::new(self.color_model))
                } else {
                    warn_unsupported(value);
                    Rc::new(NoInterpolation)
                }
            }
            // Resolved against the decomposed representation in interpolate.
            Value::Custom(custom) => self.resolve(&custom.decompose()),
        }
    }

    fn interpolate_custom(&self, custom: &Custom, from: &Value, to: &Value) -> Interpolator {
        let current: InterpolationHandle = Rc::new(*self);
        let inner_from = match from {
            Value::Custom(c) => c.decompose(),
            other => other.clone(),
        };
        let inner_to = match to {
            Value::Custom(c) => c.decompose(),
            other => other.clone(),
        };
        let chosen = custom
            .interpolation_for(&current)
            .filter(|candidate| !candidate.is_generic())
            .unwrap_or_else(|| self.resolve(&inner_from));
        let sampler = chosen.interpolate(&inner_from, &inner_to);
        let rebuild = custom.clone();
        Box::new(move |progress| rebuild.recompose(sampler(progress)))
    }
}

impl Interpolation for ValueInterpolation {
    fn interpolate(&self, from: &Value, to: &Value) -> Interpolator {
        match (from, to) {
            (Value::Custom(custom), _) => self.interpolate_custom(custom, from, to),
            (_, Value::Custom(custom)) => self.interpolate_custom(custom, from, to),
            _ => self.resolve(from).interpolate(from, to),
        }
    }

    fn is_generic(&self) -> bool {
        true
    }
}

/// Diagnose each uninterpolable shape once, then fall back silently.
fn warn_unsupported(value: &Value) {
    thread_local! {
        static WARNED: RefCell<FxHashSet<String>> = RefCell::new(FxHashSet::default());
    }
    let key = format!("{value:?}");
    let first = WARNED.with(|warned| warned.borrow_mut().insert(key));
    if first {
        tracing::warn!("no interpolation defined for {value:?}, falling back to step");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::CustomInterpolation;

    fn assert_number(value: Value, expected: f64) {
        let n = value.as_number().unwrap();
        assert!((n - expected).abs() < 1e-9, "{n} vs {expected}");
    }

    #[test]
    fn test_number_interpolation_is_linear() {
        let sampler = NumberInterpolation.interpolate(&Value::Number(10.0), &Value::Number(90.0));
        assert_number(sampler(0.0), 10.0);
        assert_number(sampler(0.5), 50.0);
        assert_number(sampler(1.0), 90.0);
    }

    #[test]
    fn test_number_interpolation_extrapolates() {
        let sampler = NumberInterpolation.interpolate(&Value::Number(0.0), &Value::Number(10.0));
        assert_number(sampler(-0.5), -5.0);
        assert_number(sampler(1.5), 15.0);
    }

    #[test]
    fn test_step_switches_at_one() {
        let sampler = NoInterpolation.interpolate(&Value::Bool(false), &Value::Bool(true));
        assert_eq!(sampler(0.0), Value::Bool(false));
        assert_eq!(sampler(0.5), Value::Bool(false));
        assert_eq!(sampler(0.999), Value::Bool(false));
        assert_eq!(sampler(1.0), Value::Bool(true));
        assert_eq!(sampler(2.0), Value::Bool(true));
    }

    #[test]
    fn test_dispatcher_handles_booleans() {
        let sampler = any().interpolate(&Value::Bool(false), &Value::Bool(true));
        assert_eq!(sampler(0.5), Value::Bool(false));
        assert_eq!(sampler(1.0), Value::Bool(true));
    }

    #[test]
    fn test_object_interpolation_union_of_keys() {
        let from = Value::object([("a", 1.0), ("c", 3.0)]);
        let to = Value::object([("a", 4.0), ("b", 5.0)]);
        let sampler = any().interpolate(&from, &to);

        assert_eq!(sampler(0.0), Value::object([("a", 1.0), ("b", 5.0), ("c", 3.0)]));
        assert_eq!(sampler(0.5), Value::object([("a", 2.5), ("b", 5.0), ("c", 3.0)]));
        assert_eq!(sampler(1.0), Value::object([("a", 4.0), ("b", 5.0), ("c", 3.0)]));
    }

    #[test]
    fn test_nested_objects() {
        let from = Value::object([("point", Value::object([("x", 0.0), ("y", 10.0)]))]);
        let to = Value::object([("point", Value::object([("x", 10.0), ("y", 0.0)]))]);
        let sampler = any().interpolate(&from, &to);
        let half = sampler(0.5);
        let point = half.as_object().unwrap().get("point").unwrap();
        assert_eq!(point, &Value::object([("x", 5.0), ("y", 5.0)]));
    }

    #[test]
    fn test_mixed_shape_object_members() {
        let from = Value::object([("x", Value::from(10.0)), ("on", Value::from(true))]);
        let to = Value::object([("x", Value::from(90.0)), ("on", Value::from(false))]);
        let sampler = any().interpolate(&from, &to);
        let half = sampler(0.5);
        let map = half.as_object().unwrap();
        assert_eq!(map.get("x"), Some(&Value::Number(50.0)));
        assert_eq!(map.get("on"), Some(&Value::Bool(true)));
        let end = sampler(1.0);
        assert_eq!(end.as_object().unwrap().get("on"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_colors_dispatch_including_text_endpoints() {
        let sampler = any().interpolate(&Value::from("red"), &Value::from("blue"));
        let half = sampler(0.5);
        let color = half.as_color().unwrap();
        assert!((color.r - 0.5).abs() < 1e-9);
        assert!((color.b - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_text_falls_back_to_step() {
        let sampler = any().interpolate(&Value::from("aap"), &Value::from("noot"));
        assert_eq!(sampler(0.0), Value::from("aap"));
        assert_eq!(sampler(0.5), Value::from("aap"));
        assert_eq!(sampler(1.0), Value::from("noot"));
    }

    #[derive(Debug)]
    struct Score {
        value: f64,
        candidate: Option<InterpolationHandle>,
    }

    impl Score {
        fn value_of(sample: &Value) -> f64 {
            sample
                .as_custom()
                .and_then(|c| c.downcast_ref::<Score>())
                .map(|s| s.value)
                .unwrap_or(f64::NAN)
        }
    }

    impl CustomInterpolation for Score {
        fn decompose(&self) -> Value {
            Value::object([("value", self.value)])
        }

        fn recompose(&self, value: Value) -> Value {
            let inner = value
                .as_object()
                .and_then(|map| map.get("value"))
                .and_then(Value::as_number)
                .unwrap_or(0.0);
            Value::Custom(Custom::new(Score {
                value: inner,
                candidate: None,
            }))
        }

        fn interpolation_for(&self, _current: &InterpolationHandle) -> Option<InterpolationHandle> {
            self.candidate.clone()
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[test]
    fn test_custom_without_candidate_uses_structural_interpolation() {
        let from = Value::Custom(Custom::new(Score {
            value: 1.0,
            candidate: None,
        }));
        let to = Value::Custom(Custom::new(Score {
            value: 3.0,
            candidate: None,
        }));
        let sampler = any().interpolate(&from, &to);
        assert!((Score::value_of(&sampler(0.3)) - 1.6).abs() < 1e-9);
        assert!((Score::value_of(&sampler(1.0)) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_returning_the_dispatcher_is_ignored() {
        let from = Value::Custom(Custom::new(Score {
            value: 1.0,
            candidate: Some(any()),
        }));
        let to = Value::Custom(Custom::new(Score {
            value: 3.0,
            candidate: None,
        }));
        let sampler = any().interpolate(&from, &to);
        // Structural resolution still interpolates the inner number.
        assert!((Score::value_of(&sampler(0.3)) - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_custom_returning_a_bare_dispatcher_instance_is_ignored() {
        let bare: InterpolationHandle = Rc::new(ValueInterpolation::new());
        let from = Value::Custom(Custom::new(Score {
            value: 1.0,
            candidate: Some(bare),
        }));
        let to = Value::Custom(Custom::new(Score {
            value: 3.0,
            candidate: None,
        }));
        let sampler = any().interpolate(&from, &to);
        assert!((Score::value_of(&sampler(0.3)) - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_specialized_custom_interpolation_is_honored() {
        let stepped: InterpolationHandle = Rc::new(ObjectInterpolation::new(Rc::new(NoInterpolation)));
        let from = Value::Custom(Custom::new(Score {
            value: 1.0,
            candidate: Some(stepped),
        }));
        let to = Value::Custom(Custom::new(Score {
            value: 3.0,
            candidate: None,
        }));
        let sampler = any().interpolate(&from, &to);
        assert!((Score::value_of(&sampler(0.3)) - 1.0).abs() < 1e-9);
        assert!((Score::value_of(&sampler(0.9)) - 1.0).abs() < 1e-9);
        assert!((Score::value_of(&sampler(1.0)) - 3.0).abs() < 1e-9);
    }
}
