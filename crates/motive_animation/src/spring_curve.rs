//! Spring curve conversions
//!
//! Maps between the physical spring parameters (tension, friction, mass)
//! and the designer-facing pair of damping ratio and visual duration.
//! Combinations without a solution report `None` instead of guessing.

use crate::spring::SpringOptions;

/// Amplitude envelope treated as settled when deriving a visual duration.
const SETTLE_EPSILON: f64 = 0.001;

/// Damping ratio of a spring: < 1 oscillates, 1 is critically damped,
/// > 1 creeps without crossing the target.
pub fn compute_damping_ratio(tension: f64, friction: f64, mass: f64) -> f64 {
    friction / (2.0 * (mass * tension).sqrt())
}

/// Approximate time for the oscillation envelope to settle, seconds.
///
/// Solvable only for underdamped springs; `None` otherwise, and for
/// initial velocities that push the envelope past the settle threshold
/// from the start.
pub fn compute_duration(tension: f64, friction: f64, velocity: f64, mass: f64) -> Option<f64> {
    let damping_ratio = compute_damping_ratio(tension, friction, mass);
    if damping_ratio >= 1.0 {
        return None;
    }
    let undamped_frequency = (tension / mass).sqrt();
    let a = (1.0 - damping_ratio * damping_ratio).sqrt();
    let b = velocity / (a * undamped_frequency);
    let c = damping_ratio / a;
    let d = -((b - c) / SETTLE_EPSILON);
    if d <= 0.0 {
        return None;
    }
    Some(d.ln() / (damping_ratio * undamped_frequency))
}

/// Invert `compute_duration`: find the spring constants that realize a
/// damping ratio and visual duration, by bisecting over tension.
pub fn derive_curve_options(
    damping_ratio: f64,
    duration: f64,
    velocity: f64,
    mass: f64,
) -> Option<SpringOptions> {
    if damping_ratio <= 0.0 || damping_ratio >= 1.0 || duration <= 0.0 || mass <= 0.0 {
        return None;
    }

    let friction_for = |tension: f64| 2.0 * damping_ratio * (mass * tension).sqrt();
    let duration_for = |tension: f64| compute_duration(tension, friction_for(tension), velocity, mass);

    // Duration shrinks as tension grows; check the target is reachable.
    let mut lo = 1e-2;
    let mut hi = 1e8;
    let longest = duration_for(lo)?;
    let shortest = duration_for(hi)?;
    if duration > longest || duration < shortest {
        return None;
    }

    for _ in 0..64 {
        // Geometric midpoint: tension spans many orders of magnitude.
        let mid = (lo * hi).sqrt();
        let mid_duration = duration_for(mid)?;
        if mid_duration > duration {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let tension = (lo * hi).sqrt();
    Some(SpringOptions {
        tension,
        friction: friction_for(tension),
        velocity,
        ..SpringOptions::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() < eps, "{a} vs {b}");
    }

    #[test]
    fn test_damping_ratio() {
        assert_close(compute_damping_ratio(10.0, 12.0, 2.0), 12.0 / (2.0 * 20f64.sqrt()), 1e-12);
        assert_close(compute_damping_ratio(1.0, 1.0, 1.0), 0.5, 1e-12);
        assert_close(compute_damping_ratio(100.0, 20.0, 1.0), 1.0, 1e-12);
    }

    #[test]
    fn test_duration_for_underdamped_spring() {
        // zeta = 0.5, w0 = 1: envelope settles at ln(577.35) / 0.5.
        let duration = compute_duration(1.0, 1.0, 0.0, 1.0).unwrap();
        assert_close(duration, 12.7169, 1e-3);
    }

    #[test]
    fn test_duration_is_none_when_not_underdamped() {
        // zeta = sqrt(10)/2 > 1.
        assert_eq!(compute_duration(10.0, 10.0, 0.0, 1.0), None);
        // Critically damped exactly.
        assert_eq!(compute_duration(100.0, 20.0, 0.0, 1.0), None);
    }

    #[test]
    fn test_duration_is_none_for_escaping_velocity() {
        // A large initial velocity pushes the envelope past the threshold.
        assert_eq!(compute_duration(1.0, 1.0, 1e6, 1.0), None);
    }

    #[test]
    fn test_derive_round_trips_through_compute_duration() {
        for (zeta, target) in [(0.5, 12.7169), (0.2, 3.0), (0.8, 0.5)] {
            let options = derive_curve_options(zeta, target, 0.0, 1.0).unwrap();
            assert_close(compute_damping_ratio(options.tension, options.friction, 1.0), zeta, 1e-9);
            let realized =
                compute_duration(options.tension, options.friction, 0.0, 1.0).unwrap();
            assert_close(realized, target, 1e-6);
        }
    }

    #[test]
    fn test_derive_rejects_unsolvable_input() {
        assert!(derive_curve_options(1.0, 1.0, 0.0, 1.0).is_none());
        assert!(derive_curve_options(1.5, 1.0, 0.0, 1.0).is_none());
        assert!(derive_curve_options(0.5, 0.0, 0.0, 1.0).is_none());
        assert!(derive_curve_options(0.5, -2.0, 0.0, 1.0).is_none());
    }
}
