//! Dynamic value vocabulary
//!
//! Everything the engine animates is a `Value`: numbers, booleans, colors,
//! nested keyed structures, free-form text, or a custom type that carries
//! its own interpolation capability.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::color::Color;
use crate::interpolation::InterpolationHandle;

/// Keyed structure with deterministic field order.
pub type ValueMap = BTreeMap<String, Value>;

/// A dynamically shaped animatable value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Color(Color),
    Object(ValueMap),
    /// Free-form text. Not interpolable unless it parses as a color.
    Text(String),
    /// User-defined value with the `CustomInterpolation` capability.
    Custom(Custom),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ValueMap> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_custom(&self) -> Option<&Custom> {
        match self {
            Self::Custom(c) => Some(c),
            _ => None,
        }
    }

    /// Build an object value from key/value pairs.
    pub fn object<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Color> for Value {
    fn from(c: Color) -> Self {
        Self::Color(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Self::Object(map)
    }
}

/// Capability a value type implements to take part in interpolation.
///
/// `decompose` exposes a structural representation the generic machinery
/// can interpolate; `recompose` rebuilds a like value from one sample of
/// that representation. `interpolation_for` may hand back a specialized
/// interpolation; returning the generic dispatcher (anything whose
/// `is_generic()` is true) is ignored by the resolver, since honoring it
/// would recurse without ever specializing.
pub trait CustomInterpolation: fmt::Debug {
    fn decompose(&self) -> Value;

    fn recompose(&self, value: Value) -> Value;

    fn interpolation_for(&self, _current: &InterpolationHandle) -> Option<InterpolationHandle> {
        None
    }

    fn as_any(&self) -> &dyn std::any::Any;
}

/// Shared handle to a custom value.
#[derive(Clone)]
pub struct Custom {
    inner: Rc<dyn CustomInterpolation>,
}

impl Custom {
    pub fn new(inner: impl CustomInterpolation + 'static) -> Self {
        Self {
            inner: Rc::new(inner),
        }
    }

    pub fn decompose(&self) -> Value {
        self.inner.decompose()
    }

    pub fn recompose(&self, value: Value) -> Value {
        self.inner.recompose(value)
    }

    pub fn interpolation_for(&self, current: &InterpolationHandle) -> Option<InterpolationHandle> {
        self.inner.interpolation_for(current)
    }

    /// Downcast access to the concrete custom type.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for Custom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

/// Custom values compare by their structural representation.
impl PartialEq for Custom {
    fn eq(&self, other: &Self) -> bool {
        self.decompose() == other.decompose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_builder() {
        let value = Value::object([("x", 1.0), ("y", 2.0)]);
        let map = value.as_object().unwrap();
        assert_eq!(map.get("x"), Some(&Value::Number(1.0)));
        assert_eq!(map.get("y"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(3), Value::Number(3.0));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from("red"), Value::Text("red".to_owned()));
    }

    #[derive(Debug)]
    struct Wrapped(f64);

    impl CustomInterpolation for Wrapped {
        fn decompose(&self) -> Value {
            Value::Number(self.0)
        }

        fn recompose(&self, value: Value) -> Value {
            Value::Custom(Custom::new(Wrapped(value.as_number().unwrap_or(0.0))))
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    #[test]
    fn test_custom_equality_is_structural() {
        let a = Custom::new(Wrapped(4.0));
        let b = Custom::new(Wrapped(4.0));
        let c = Custom::new(Wrapped(5.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.downcast_ref::<Wrapped>().is_some());
    }
}
