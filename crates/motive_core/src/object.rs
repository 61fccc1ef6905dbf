//! Keyed groups of observable values
//!
//! An `ObservableObject` wraps every field of a keyed structure in its own
//! `Animatable` and lets observers watch the group as a whole. Member
//! changes flushed from one transaction collapse into a single group
//! notification.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::observable::{Animatable, Subscription};
use crate::transaction::TransactionId;
use crate::value::{Value, ValueMap};

new_key_type! {
    struct ObserverKey;
}

type ObserverHandler = Rc<RefCell<dyn FnMut(&ObservableObject, Option<TransactionId>)>>;

struct ObjectInner {
    members: BTreeMap<String, Animatable<Value>>,
    // Keeps member forwarders alive for the object's lifetime.
    member_subs: Vec<Subscription>,
    observers: SlotMap<ObserverKey, ObserverHandler>,
    last_transaction: Option<TransactionId>,
}

/// A keyed group of observable values with group-level observers.
#[derive(Clone)]
pub struct ObservableObject {
    inner: Rc<RefCell<ObjectInner>>,
}

impl ObservableObject {
    pub fn new(initial: ValueMap) -> Self {
        let object = Self {
            inner: Rc::new(RefCell::new(ObjectInner {
                members: BTreeMap::new(),
                member_subs: Vec::new(),
                observers: SlotMap::with_key(),
                last_transaction: None,
            })),
        };
        for (key, value) in initial {
            object.insert_member(key, value);
        }
        object
    }

    /// Handle to one member's observable.
    pub fn get(&self, key: &str) -> Option<Animatable<Value>> {
        self.inner.borrow().members.get(key).cloned()
    }

    /// Write through to a member, creating it if absent.
    pub fn set(&self, key: &str, value: Value) {
        let member = self.get(key);
        match member {
            Some(member) => member.set(value),
            None => {
                self.insert_member(key.to_owned(), value.clone());
                // The forwarder only fires on changes, so announce the
                // insertion explicitly.
                if let Some(member) = self.get(key) {
                    member.set(value);
                }
            }
        }
    }

    /// Snapshot of every member's current value.
    pub fn values(&self) -> ValueMap {
        self.inner
            .borrow()
            .members
            .iter()
            .map(|(key, member)| (key.clone(), member.get()))
            .collect()
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.borrow().members.keys().cloned().collect()
    }

    /// Observe the group. The handler fires after any member changes;
    /// member flushes sharing one transaction id fire it only once.
    pub fn add_observer(
        &self,
        f: impl FnMut(&ObservableObject, Option<TransactionId>) + 'static,
    ) -> Subscription {
        let key = {
            let mut inner = self.inner.borrow_mut();
            inner.observers.insert(Rc::new(RefCell::new(f)))
        };
        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().observers.remove(key);
            }
        })
    }

    fn insert_member(&self, key: String, value: Value) {
        let member = Animatable::new(value);
        let weak = Rc::downgrade(&self.inner);
        let sub = member.on_update(move |_, txn| {
            if let Some(inner) = weak.upgrade() {
                Self::forward(&inner, txn);
            }
        });
        let mut inner = self.inner.borrow_mut();
        inner.members.insert(key, member);
        inner.member_subs.push(sub);
    }

    fn forward(inner: &Rc<RefCell<ObjectInner>>, transaction: Option<TransactionId>) {
        {
            let mut borrowed = inner.borrow_mut();
            if let Some(id) = transaction {
                if borrowed.last_transaction == Some(id) {
                    return;
                }
                borrowed.last_transaction = Some(id);
            }
        }
        let object = ObservableObject {
            inner: inner.clone(),
        };
        let snapshot: SmallVec<[(ObserverKey, ObserverHandler); 2]> = inner
            .borrow()
            .observers
            .iter()
            .map(|(key, handler)| (key, handler.clone()))
            .collect();
        for (key, handler) in snapshot {
            let live = inner.borrow().observers.contains_key(key);
            if live {
                if let Ok(mut f) = handler.try_borrow_mut() {
                    f(&object, transaction);
                }
            }
        }
    }
}
