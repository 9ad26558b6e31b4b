//! Frontier abstractions.
//!
//! The kernel only ever pushes onto a frontier; removal is strategy specific.
//! Single-threaded engines pop without waiting, worker pools use a bounded
//! wait through [`ConcurrentFrontier::pop_timeout`].

use std::cell::RefCell;
use std::time::Duration;

use crate::search::threading::SharedSearchState;

/// Collection of histories awaiting expansion.
pub trait Frontier<T> {
    fn push(&self, item: T);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of a bounded pop.
#[derive(Debug, PartialEq, Eq)]
pub enum PopOutcome<T> {
    Item(T),
    /// The wait elapsed without an item arriving.
    TimedOut,
    /// The frontier was interrupted for shutdown.
    Interrupted,
}

/// Frontier that many workers push to and pop from without external locking.
pub trait ConcurrentFrontier<T>: Frontier<T> + Send + Sync {
    /// Remove the next item, waiting at most `timeout` for one to arrive.
    fn pop_timeout(&self, timeout: Duration) -> PopOutcome<T>;

    /// Wake every waiter; subsequent pops return `Interrupted` immediately.
    fn interrupt(&self);

    fn is_interrupted(&self) -> bool;
}

/// Explicit LIFO stack for the single-threaded engine.
#[derive(Debug)]
pub struct StackFrontier<T> {
    items: RefCell<Vec<T>>,
}

impl<T> Default for StackFrontier<T> {
    fn default() -> Self {
        Self {
            items: RefCell::new(Vec::new()),
        }
    }
}

impl<T> StackFrontier<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop(&self) -> Option<T> {
        self.items.borrow_mut().pop()
    }
}

impl<T> Frontier<T> for StackFrontier<T> {
    fn push(&self, item: T) {
        self.items.borrow_mut().push(item);
    }

    fn len(&self) -> usize {
        self.items.borrow().len()
    }
}

/// Counts every push as pending work before it reaches the wrapped frontier.
pub struct TrackedFrontier<'a, Q: ?Sized> {
    inner: &'a Q,
    shared: &'a SharedSearchState,
}

impl<'a, Q: ?Sized> TrackedFrontier<'a, Q> {
    pub fn new(inner: &'a Q, shared: &'a SharedSearchState) -> Self {
        Self { inner, shared }
    }
}

impl<T, Q: Frontier<T> + ?Sized> Frontier<T> for TrackedFrontier<'_, Q> {
    fn push(&self, item: T) {
        self.shared.node_queued();
        self.inner.push(item);
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
