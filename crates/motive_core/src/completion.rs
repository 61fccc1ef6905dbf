//! Completion signalling
//!
//! A `Completion` is a three-state variable (pending, resolved, rejected)
//! with a waiter list. Deliveries never run inside the call that settles
//! the state; they are pushed onto a `DeferredQueue` the host drains once
//! per scheduling turn. Waiters attached after settlement are still
//! delivered, on the next drain.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use thiserror::Error;

/// The rejection payload: the animation went away before finishing.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("animation was cancelled before completing")]
pub struct AnimationCancelled;

/// Outcome handed to completion waiters.
pub type CompletionResult = Result<(), AnimationCancelled>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionState {
    Pending,
    Resolved,
    Rejected,
}

/// FIFO of deferred thunks, shared by clone.
///
/// Real-time hosts drain it once per frame; tests drain it explicitly.
/// Draining also runs thunks queued while draining.
#[derive(Clone, Default)]
pub struct DeferredQueue {
    inner: Rc<RefCell<VecDeque<Box<dyn FnOnce()>>>>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defer(&self, f: impl FnOnce() + 'static) {
        self.inner.borrow_mut().push_back(Box::new(f));
    }

    /// Run thunks until the queue is empty. Returns how many ran.
    pub fn drain(&self) -> usize {
        let mut count = 0;
        loop {
            let next = self.inner.borrow_mut().pop_front();
            match next {
                Some(thunk) => {
                    thunk();
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }
}

struct CompletionInner {
    state: CompletionState,
    waiters: Vec<Box<dyn FnOnce(CompletionResult)>>,
}

/// Cached completion signal for one animation run.
#[derive(Clone)]
pub struct Completion {
    inner: Rc<RefCell<CompletionInner>>,
    queue: DeferredQueue,
}

impl Completion {
    pub fn new(queue: &DeferredQueue) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CompletionInner {
                state: CompletionState::Pending,
                waiters: Vec::new(),
            })),
            queue: queue.clone(),
        }
    }

    pub fn state(&self) -> CompletionState {
        self.inner.borrow().state
    }

    /// Register a waiter. If the state is already settled, delivery is
    /// scheduled for the next drain rather than invoked reentrantly.
    pub fn on_settled(&self, f: impl FnOnce(CompletionResult) + 'static) {
        let settled = {
            let mut inner = self.inner.borrow_mut();
            match inner.state {
                CompletionState::Pending => {
                    inner.waiters.push(Box::new(f));
                    return;
                }
                CompletionState::Resolved => Ok(()),
                CompletionState::Rejected => Err(AnimationCancelled),
            }
        };
        self.queue.defer(move || f(settled));
    }

    pub fn resolve(&self) {
        self.settle(CompletionState::Resolved, Ok(()));
    }

    pub fn reject(&self) {
        self.settle(CompletionState::Rejected, Err(AnimationCancelled));
    }

    /// First settlement wins; later calls are no-ops.
    fn settle(&self, state: CompletionState, result: CompletionResult) {
        let waiters = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != CompletionState::Pending {
                return;
            }
            inner.state = state;
            std::mem::take(&mut inner.waiters)
        };
        for waiter in waiters {
            self.queue.defer(move || waiter(result));
        }
    }
}
