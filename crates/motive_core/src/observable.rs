//! Observable values
//!
//! An `Animatable` wraps a current value and broadcasts changes to
//! subscribers. Writes made through a transaction coalesce into a single
//! notification per value (see the `transaction` module).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::transaction::TransactionId;
use crate::value::{Custom, CustomInterpolation, Value};

new_key_type! {
    /// Versioned key for one subscription entry. Keys are never reused for
    /// a different subscription, so a stale cancel handle stays inert.
    pub struct SubscriptionKey;
}

/// Payload delivered to subscribers on every notification.
#[derive(Clone, Debug, PartialEq)]
pub struct Change<V> {
    pub value: V,
    pub old_value: V,
}

/// A subscriber callback with clonable identity.
///
/// Subscribing the same handler (by identity) twice delivers once; a plain
/// closure passed to `Animatable::on_update` gets a fresh identity.
pub struct UpdateHandler<V> {
    f: Rc<RefCell<dyn FnMut(&Change<V>, Option<TransactionId>)>>,
}

impl<V> UpdateHandler<V> {
    pub fn new(f: impl FnMut(&Change<V>, Option<TransactionId>) + 'static) -> Self
    where
        V: 'static,
    {
        Self {
            f: Rc::new(RefCell::new(f)),
        }
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.f, &other.f)
    }

    fn call(&self, change: &Change<V>, transaction: Option<TransactionId>) {
        // A handler that re-enters a set on the same value is skipped for
        // the nested dispatch; bookkeeping stays intact either way.
        if let Ok(mut f) = self.f.try_borrow_mut() {
            f(change, transaction);
        }
    }
}

impl<V> Clone for UpdateHandler<V> {
    fn clone(&self) -> Self {
        Self { f: self.f.clone() }
    }
}

/// Cancel handle for one subscription.
///
/// Cancelling is idempotent, and a handle outlived by its subscription
/// arena is inert. Re-subscribing the same handler yields an independent
/// handle; the old one can never cancel the new entry.
#[must_use = "dropping the handle keeps the subscription alive but loses the ability to cancel it"]
pub struct Subscription {
    cancel: Box<dyn Fn()>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl Fn() + 'static) -> Self {
        Self {
            cancel: Box::new(cancel),
        }
    }

    pub fn cancel(&self) {
        (self.cancel)();
    }
}

struct AnimatableInner<V> {
    value: V,
    subscribers: SlotMap<SubscriptionKey, UpdateHandler<V>>,
    pending: Option<PendingTransaction<V>>,
}

/// First-touch snapshot for a transaction in flight.
struct PendingTransaction<V> {
    id: TransactionId,
    old_value: V,
}

/// Observable container for a single value.
///
/// Handles are cheap clones sharing one underlying cell; dropping the last
/// handle releases the value and its subscriptions.
pub struct Animatable<V = Value> {
    inner: Rc<RefCell<AnimatableInner<V>>>,
}

impl<V> Clone for Animatable<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Animatable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(inner) => write!(f, "Animatable({:?})", inner.value),
            Err(_) => write!(f, "Animatable(<borrowed>)"),
        }
    }
}

impl<V: Clone + 'static> Animatable<V> {
    pub fn new(initial: V) -> Self {
        Self {
            inner: Rc::new(RefCell::new(AnimatableInner {
                value: initial,
                subscribers: SlotMap::with_key(),
                pending: None,
            })),
        }
    }

    pub fn get(&self) -> V {
        self.inner.borrow().value.clone()
    }

    /// Set the value and notify subscribers synchronously.
    pub fn set(&self, value: V) {
        let change = {
            let mut inner = self.inner.borrow_mut();
            let old_value = std::mem::replace(&mut inner.value, value);
            Change {
                value: inner.value.clone(),
                old_value,
            }
        };
        self.notify(&change, None);
    }

    /// Set the value without notifying anyone.
    pub fn set_silent(&self, value: V) {
        self.inner.borrow_mut().value = value;
    }

    /// Subscribe a fresh handler. See `subscribe` for identity semantics.
    pub fn on_update(
        &self,
        f: impl FnMut(&Change<V>, Option<TransactionId>) + 'static,
    ) -> Subscription {
        self.subscribe(&UpdateHandler::new(f))
    }

    /// Subscribe a handler with explicit identity. Subscribing a handler
    /// that is already registered returns a handle to the existing entry
    /// instead of double-registering it.
    pub fn subscribe(&self, handler: &UpdateHandler<V>) -> Subscription {
        let key = {
            let mut inner = self.inner.borrow_mut();
            let existing = inner
                .subscribers
                .iter()
                .find(|(_, h)| h.ptr_eq(handler))
                .map(|(key, _)| key);
            match existing {
                Some(key) => key,
                None => inner.subscribers.insert(handler.clone()),
            }
        };
        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().subscribers.remove(key);
            }
        })
    }

    /// Deliver a change to every live subscriber.
    ///
    /// The subscriber set is snapshotted up front and each entry is
    /// re-checked for liveness right before its call, so a subscriber
    /// removed during dispatch (by itself or a sibling) is not invoked
    /// again within this dispatch, and late additions wait for the next
    /// change.
    pub(crate) fn notify(&self, change: &Change<V>, transaction: Option<TransactionId>) {
        let snapshot: SmallVec<[(SubscriptionKey, UpdateHandler<V>); 4]> = self
            .inner
            .borrow()
            .subscribers
            .iter()
            .map(|(key, handler)| (key, handler.clone()))
            .collect();
        for (key, handler) in snapshot {
            let live = self.inner.borrow().subscribers.contains_key(key);
            if live {
                handler.call(change, transaction);
            }
        }
    }

    /// Record the pre-transaction value on first touch. Returns true when
    /// this call was the first touch for the given transaction.
    pub(crate) fn begin_pending(&self, id: TransactionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.pending.is_some() {
            return false;
        }
        let old_value = inner.value.clone();
        inner.pending = Some(PendingTransaction { id, old_value });
        true
    }

    /// Apply a value without notifying; reads inside the transaction scope
    /// observe it immediately.
    pub(crate) fn apply(&self, value: V) {
        self.inner.borrow_mut().value = value;
    }

    /// Flush the pending transaction state as one notification.
    pub(crate) fn flush_pending(&self) {
        let flushed = {
            let mut inner = self.inner.borrow_mut();
            inner.pending.take().map(|pending| {
                (
                    Change {
                        value: inner.value.clone(),
                        old_value: pending.old_value,
                    },
                    pending.id,
                )
            })
        };
        if let Some((change, id)) = flushed {
            self.notify(&change, Some(id));
        }
    }
}

impl<V: Clone + Default + 'static> Default for Animatable<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

/// Embeds an observable value inside a `Value`.
///
/// Interpolating two embedded observables interpolates their current
/// contents and produces a fresh observable per sample, so animated
/// structures can carry live values without special cases upstream.
#[derive(Clone)]
pub struct AnimatableValue {
    inner: Animatable<Value>,
}

impl AnimatableValue {
    pub fn new(inner: Animatable<Value>) -> Self {
        Self { inner }
    }

    /// Wrap an observable into a `Value`.
    pub fn wrap(inner: Animatable<Value>) -> Value {
        Value::Custom(Custom::new(Self::new(inner)))
    }

    pub fn get(&self) -> Value {
        self.inner.get()
    }

    pub fn animatable(&self) -> Animatable<Value> {
        self.inner.clone()
    }
}

impl fmt::Debug for AnimatableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnimatableValue({:?})", self.inner)
    }
}

impl CustomInterpolation for AnimatableValue {
    fn decompose(&self) -> Value {
        self.inner.get()
    }

    fn recompose(&self, value: Value) -> Value {
        Self::wrap(Animatable::new(value))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_holds_initial_value() {
        let value = Animatable::new(10.0_f64);
        assert_eq!(value.get(), 10.0);
    }

    #[test]
    fn test_set_updates_value() {
        let value = Animatable::new(1.0_f64);
        value.set(2.0);
        assert_eq!(value.get(), 2.0);
    }

    #[test]
    fn test_set_silent_skips_notification() {
        let value = Animatable::new(1.0_f64);
        let calls = Rc::new(Cell::new(0));
        let calls_in = calls.clone();
        let _sub = value.on_update(move |_, _| calls_in.set(calls_in.get() + 1));
        value.set_silent(2.0);
        assert_eq!(value.get(), 2.0);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_notifies_listener_with_change() {
        let value = Animatable::new(1.0_f64);
        let seen: Rc<RefCell<Vec<(f64, f64)>>> = Rc::new(RefCell::new(Vec::new()));
        let seen_in = seen.clone();
        let _sub = value.on_update(move |change, txn| {
            assert!(txn.is_none());
            seen_in.borrow_mut().push((change.old_value, change.value));
        });
        value.set(2.0);
        assert_eq!(*seen.borrow(), vec![(1.0, 2.0)]);
    }

    #[test]
    fn test_notifies_multiple_listeners() {
        let value = Animatable::new(1.0_f64);
        let calls = Rc::new(Cell::new(0));
        let a = calls.clone();
        let b = calls.clone();
        let _sub1 = value.on_update(move |_, _| a.set(a.get() + 1));
        let _sub2 = value.on_update(move |_, _| b.set(b.get() + 1));
        value.set(2.0);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_cancel_removes_listener() {
        let value = Animatable::new(1.0_f64);
        let calls = Rc::new(Cell::new(0));
        let calls_in = calls.clone();
        let sub = value.on_update(move |_, _| calls_in.set(calls_in.get() + 1));
        value.set(2.0);
        sub.cancel();
        value.set(3.0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_stale_cancel_handle_is_inert_after_resubscribe() {
        let value = Animatable::new(1.0_f64);
        let seen: Rc<RefCell<Vec<f64>>> = Rc::new(RefCell::new(Vec::new()));
        let seen_in = seen.clone();
        let handler = UpdateHandler::new(move |change: &Change<f64>, _| {
            seen_in.borrow_mut().push(change.value);
        });

        let old_cancel = value.subscribe(&handler);
        old_cancel.cancel();
        value.set(2.0);
        assert!(seen.borrow().is_empty());

        let _fresh = value.subscribe(&handler);
        value.set(3.0);
        assert_eq!(*seen.borrow(), vec![3.0]);

        // The stale handle must not cancel the new subscription.
        old_cancel.cancel();
        value.set(4.0);
        assert_eq!(*seen.borrow(), vec![3.0, 4.0]);
    }

    #[test]
    fn test_duplicate_handler_delivers_once() {
        let value = Animatable::new(1.0_f64);
        let calls = Rc::new(Cell::new(0));
        let calls_in = calls.clone();
        let handler = UpdateHandler::new(move |_: &Change<f64>, _| {
            calls_in.set(calls_in.get() + 1);
        });
        let _a = value.subscribe(&handler);
        let _b = value.subscribe(&handler);
        value.set(2.0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_sibling_cancelled_during_dispatch_is_skipped() {
        let value = Animatable::new(1.0_f64);
        let calls = Rc::new(Cell::new(0));

        // Registered first so it dispatches first, then cancels its sibling.
        let sibling_cancel: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let cancel_in = sibling_cancel.clone();
        let _first = value.on_update(move |_, _| {
            if let Some(sub) = cancel_in.borrow().as_ref() {
                sub.cancel();
            }
        });
        let calls_in = calls.clone();
        let second = value.on_update(move |_, _| calls_in.set(calls_in.get() + 1));
        *sibling_cancel.borrow_mut() = Some(second);

        value.set(2.0);
        assert_eq!(calls.get(), 0);
        value.set(3.0);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_handler_added_during_dispatch_waits_for_next_change() {
        let value: Animatable<f64> = Animatable::new(1.0);
        let late_calls = Rc::new(Cell::new(0));
        let value_in = value.clone();
        let late_in = late_calls.clone();
        let added = Rc::new(Cell::new(false));
        let added_in = added.clone();
        let _sub = value.on_update(move |_, _| {
            if !added_in.get() {
                added_in.set(true);
                let late = late_in.clone();
                // Leaked on purpose; the test only observes call counts.
                std::mem::forget(value_in.on_update(move |_, _| late.set(late.get() + 1)));
            }
        });
        value.set(2.0);
        assert_eq!(late_calls.get(), 0);
        value.set(3.0);
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn test_animatable_value_round_trip() {
        let inner = Animatable::new(Value::Number(3.0));
        let wrapped = AnimatableValue::wrap(inner);
        let custom = wrapped.as_custom().unwrap();
        assert_eq!(custom.decompose(), Value::Number(3.0));
        let rebuilt = custom.recompose(Value::Number(5.0));
        let rebuilt_custom = rebuilt.as_custom().unwrap();
        assert_eq!(rebuilt_custom.decompose(), Value::Number(5.0));
    }
}
