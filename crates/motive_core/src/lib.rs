//! Motive Core Primitives
//!
//! Foundational types for the Motive animation engine:
//!
//! - **Observable Values**: subscribable containers with transactional
//!   batching, so related writes land as one notification
//! - **Interpolation**: shape-polymorphic progress-to-value functions over
//!   numbers, booleans, colors, and nested structures
//! - **Colors**: normalized RGBA with selectable mix models, including a
//!   perceptual HSLuv space
//! - **Completion**: settle-once signals with deferred delivery
//!
//! # Example
//!
//! ```rust
//! use motive_core::{transaction, Animatable};
//!
//! let width = Animatable::new(100.0_f64);
//! let sub = width.on_update(|change, _txn| {
//!     println!("{} -> {}", change.old_value, change.value);
//! });
//!
//! width.set(120.0);
//! transaction(|txn| {
//!     // Both writes flush as a single notification.
//!     txn.update(&width, 140.0);
//!     txn.update(&width, 160.0);
//! });
//! assert_eq!(width.get(), 160.0);
//! sub.cancel();
//! ```

pub mod color;
pub mod completion;
mod husl;
pub mod interpolation;
pub mod object;
pub mod observable;
pub mod transaction;
pub mod value;

pub use color::{Color, ColorError, ColorModel};
pub use completion::{
    AnimationCancelled, Completion, CompletionResult, CompletionState, DeferredQueue,
};
pub use interpolation::{
    any, ColorInterpolation, Interpolation, InterpolationHandle, Interpolator, NoInterpolation,
    NumberInterpolation, ObjectInterpolation, ValueInterpolation,
};
pub use object::ObservableObject;
pub use observable::{Animatable, AnimatableValue, Change, Subscription, UpdateHandler};
pub use transaction::{transaction, Transaction, TransactionId};
pub use value::{Custom, CustomInterpolation, Value, ValueMap};
