//! Transactional batching for observable values
//!
//! A transaction is an explicit scope object, not ambient global state.
//! Writes made through it apply immediately but defer their notifications;
//! when the scope ends, every touched value notifies exactly once with the
//! final value, the pre-transaction value, and the shared transaction id.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::observable::Animatable;

/// Identifier shared by every notification flushed from one transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransactionId(u64);

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

/// An open batching scope. Obtain one through `transaction`.
pub struct Transaction {
    id: TransactionId,
    flushes: Vec<Box<dyn FnOnce()>>,
}

impl Transaction {
    fn begin() -> Self {
        Self {
            id: TransactionId(NEXT_TRANSACTION_ID.fetch_add(1, Ordering::Relaxed)),
            flushes: Vec::new(),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Write a value through the transaction. Repeated updates to the same
    /// target coalesce; only the final value is delivered, against the
    /// value the target held when the transaction first touched it.
    pub fn update<V: Clone + 'static>(&mut self, target: &Animatable<V>, value: V) {
        if target.begin_pending(self.id) {
            let target = target.clone();
            self.flushes.push(Box::new(move || target.flush_pending()));
        }
        target.apply(value);
    }

    fn commit(self) {
        for flush in self.flushes {
            flush();
        }
    }
}

/// Run `f` inside a transaction, flushing one notification per touched
/// value when the scope ends.
pub fn transaction<R>(f: impl FnOnce(&mut Transaction) -> R) -> R {
    let mut txn = Transaction::begin();
    let result = f(&mut txn);
    txn.commit();
    result
}
