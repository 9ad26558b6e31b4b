//! Internally synchronised double-ended queue with a timed blocking pop.
//!
//! Producers push at the tail; consumers pop from the tail as well, which
//! gives each worker depth-first behaviour on the nodes it just produced.
//! An empty pop parks on a condition variable until an item arrives, the
//! deadline passes or the deque is interrupted.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::trace;

use crate::search::frontier::{ConcurrentFrontier, Frontier, PopOutcome};

#[derive(Debug)]
pub struct BlockingDeque<T> {
    items: Mutex<VecDeque<T>>,
    available: Condvar,
    interrupted: AtomicBool,
}

impl<T> Default for BlockingDeque<T> {
    fn default() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
            interrupted: AtomicBool::new(false),
        }
    }
}

impl<T> BlockingDeque<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Frontier<T> for BlockingDeque<T> {
    fn push(&self, item: T) {
        self.lock().push_back(item);
        self.available.notify_one();
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

impl<T: Send> ConcurrentFrontier<T> for BlockingDeque<T> {
    fn pop_timeout(&self, timeout: Duration) -> PopOutcome<T> {
        let deadline = Instant::now() + timeout;
        let mut guard = self.lock();
        loop {
            if self.interrupted.load(Ordering::Acquire) {
                return PopOutcome::Interrupted;
            }
            if let Some(item) = guard.pop_back() {
                return PopOutcome::Item(item);
            }
            let now = Instant::now();
            if now >= deadline {
                return PopOutcome::TimedOut;
            }
            let (next_guard, wait) = self
                .available
                .wait_timeout(guard, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            guard = next_guard;
            if !wait.timed_out() && guard.is_empty() && !self.interrupted.load(Ordering::Acquire) {
                trace!("spurious wake-up on empty deque, waiting again");
            }
        }
    }

    fn interrupt(&self) {
        // Set the flag under the lock so a waiter cannot miss it between its
        // check and its wait.
        let _guard = self.lock();
        self.interrupted.store(true, Ordering::Release);
        self.available.notify_all();
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn pops_newest_item_first() {
        let deque = BlockingDeque::new();
        deque.push(1);
        deque.push(2);
        assert_eq!(deque.len(), 2);
        assert_eq!(deque.pop_timeout(Duration::from_millis(1)), PopOutcome::Item(2));
        assert_eq!(deque.pop_timeout(Duration::from_millis(1)), PopOutcome::Item(1));
        assert!(deque.is_empty());
    }

    #[test]
    fn empty_pop_times_out() {
        let deque: BlockingDeque<u8> = BlockingDeque::new();
        let started = Instant::now();
        assert_eq!(deque.pop_timeout(Duration::from_millis(20)), PopOutcome::TimedOut);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn waiting_pop_receives_a_later_push() {
        let deque = Arc::new(BlockingDeque::new());
        let consumer = {
            let deque = Arc::clone(&deque);
            thread::spawn(move || deque.pop_timeout(Duration::from_secs(5)))
        };
        thread::sleep(Duration::from_millis(20));
        deque.push(42u32);
        assert_eq!(consumer.join().expect("consumer"), PopOutcome::Item(42));
    }

    #[test]
    fn interrupt_wakes_waiters_promptly() {
        let deque: Arc<BlockingDeque<u32>> = Arc::new(BlockingDeque::new());
        let consumer = {
            let deque = Arc::clone(&deque);
            thread::spawn(move || {
                let started = Instant::now();
                (deque.pop_timeout(Duration::from_secs(30)), started.elapsed())
            })
        };
        thread::sleep(Duration::from_millis(20));
        deque.interrupt();
        let (outcome, waited) = consumer.join().expect("consumer");
        assert_eq!(outcome, PopOutcome::Interrupted);
        assert!(waited < Duration::from_secs(5));
        assert!(deque.is_interrupted());
        deque.push(1);
        assert_eq!(deque.pop_timeout(Duration::from_millis(1)), PopOutcome::Interrupted);
    }
}
