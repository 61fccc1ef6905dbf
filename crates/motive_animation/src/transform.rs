//! Declarative range mapping
//!
//! `transform` maps an input range onto an output range: invert the input
//! value into a progress, then feed the progress to an interpolator over
//! the output range. Numeric inputs extrapolate outside the range unless
//! clamping is requested.

use std::rc::Rc;

use motive_core::{ColorModel, InterpolationHandle, Value, ValueInterpolation};

#[derive(Clone, Default)]
pub struct TransformConfig {
    /// Overrides how input progress is computed.
    pub input_interpolation: Option<InterpolationHandle>,
    /// Overrides how output values are produced. Takes precedence over
    /// `color_model`.
    pub output_interpolation: Option<InterpolationHandle>,
    /// Clamp input progress to 0..1 instead of extrapolating.
    pub limit: bool,
    /// Channel space when the output endpoints are colors.
    pub color_model: ColorModel,
}

/// Build a mapping function from an input range to an output range.
pub fn transform(
    input_range: [Value; 2],
    output_range: [Value; 2],
    config: TransformConfig,
) -> impl Fn(&Value) -> Value {
    let [input_from, input_to] = input_range;
    let [output_from, output_to] = output_range;

    let output_interpolation = config.output_interpolation.clone().unwrap_or_else(|| {
        Rc::new(ValueInterpolation::with_color_model(config.color_model)) as InterpolationHandle
    });
    let output = output_interpolation.interpolate(&output_from, &output_to);

    let probe = config
        .input_interpolation
        .as_ref()
        .map(|interpolation| interpolation.interpolate(&input_from, &input_to));
    let limit = config.limit;

    move |value: &Value| {
        let mut progress = match &probe {
            // An explicit input interpolation can only be probed: an input
            // matching its start maps to the from side, everything else to
            // the to side.
            Some(probe) => {
                if probe(0.0) == *value {
                    0.0
                } else {
                    1.0
                }
            }
            None => progress_for(value, &input_from, &input_to),
        };
        if limit {
            progress = progress.clamp(0.0, 1.0);
        }
        output(progress)
    }
}

/// One-shot convenience over `transform`.
pub fn transform_value(
    value: &Value,
    input_range: [Value; 2],
    output_range: [Value; 2],
    config: TransformConfig,
) -> Value {
    transform(input_range, output_range, config)(value)
}

/// Invert a value against a range. Numeric ranges invert in closed form
/// (degenerate ranges pin to 0), structured shapes recurse into the first
/// field with a defined progress, and everything else degrades to an
/// equality probe against the from side.
fn progress_for(value: &Value, from: &Value, to: &Value) -> f64 {
    try_progress(value, from, to).unwrap_or_else(|| if value == from { 0.0 } else { 1.0 })
}

fn try_progress(value: &Value, from: &Value, to: &Value) -> Option<f64> {
    match (value, from, to) {
        (Value::Number(v), Value::Number(a), Value::Number(b)) => {
            if (b - a).abs() < f64::EPSILON {
                None
            } else {
                Some((v - a) / (b - a))
            }
        }
        (Value::Object(v), Value::Object(a), Value::Object(b)) => {
            for (key, from_field) in a {
                if let (Some(value_field), Some(to_field)) = (v.get(key), b.get(key)) {
                    if let Some(progress) = try_progress(value_field, from_field, to_field) {
                        return Some(progress);
                    }
                }
            }
            None
        }
        (Value::Custom(v), _, _) => try_progress(&v.decompose(), &decomposed(from), &decomposed(to)),
        (_, Value::Custom(_), _) | (_, _, Value::Custom(_)) => {
            try_progress(value, &decomposed(from), &decomposed(to))
        }
        _ => None,
    }
}

fn decomposed(value: &Value) -> Value {
    match value {
        Value::Custom(custom) => custom.decompose(),
        other => other.clone(),
    }
}
