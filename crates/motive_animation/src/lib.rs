//! Motive Animation System
//!
//! Drives observable values smoothly from a source toward a target:
//!
//! - **Animators**: elapsed time to sampled value strategies - cubic
//!   bezier easing, spring physics, and precalculated playback
//! - **Drivers**: real-time and deterministic scheduling with
//!   play/cancel/finish lifecycle
//! - **Orchestration**: one controllable animation binding a target,
//!   an animator, and a driver, with a cached completion signal
//! - **Transform**: declarative range-to-range mapping

pub mod animation;
pub mod animator;
pub mod bezier;
pub mod driver;
pub mod precalculated;
pub mod spring;
pub mod spring_curve;
pub mod transform;

pub use animation::{Animation, AnimationOptions};
pub use animator::Animator;
pub use bezier::{BezierAnimator, BezierOptions, Curve};
pub use driver::{
    Driver, DriverCore, DriverState, FrameDriver, SteppedTestDriver, SyncTestDriver, UpdateSink,
};
pub use precalculated::{PrecalculatedAnimator, PrecalculatedOptions};
pub use spring::{SpringAnimator, SpringOptions};
pub use transform::{transform, transform_value, TransformConfig};
