//! Lock-free FIFO frontier for breadth-first worker pools.
//!
//! Built on `crossbeam::queue::SegQueue`. There is nothing to block on, so an
//! empty pop spins with exponential backoff and then naps in short slices
//! until the deadline, re-checking the queue and the interrupt flag between
//! naps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::queue::SegQueue;
use crossbeam::utils::Backoff;

use crate::search::frontier::{ConcurrentFrontier, Frontier, PopOutcome};

const IDLE_NAP: Duration = Duration::from_millis(1);

#[derive(Debug)]
pub struct FifoFrontier<T> {
    queue: SegQueue<T>,
    interrupted: AtomicBool,
}

impl<T> Default for FifoFrontier<T> {
    fn default() -> Self {
        Self {
            queue: SegQueue::new(),
            interrupted: AtomicBool::new(false),
        }
    }
}

impl<T> FifoFrontier<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop(&self) -> Option<T> {
        self.queue.pop()
    }
}

impl<T> Frontier<T> for FifoFrontier<T> {
    fn push(&self, item: T) {
        self.queue.push(item);
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

impl<T: Send> ConcurrentFrontier<T> for FifoFrontier<T> {
    fn pop_timeout(&self, timeout: Duration) -> PopOutcome<T> {
        let deadline = Instant::now() + timeout;
        let backoff = Backoff::new();
        loop {
            if self.interrupted.load(Ordering::Acquire) {
                return PopOutcome::Interrupted;
            }
            if let Some(item) = self.queue.pop() {
                return PopOutcome::Item(item);
            }
            let now = Instant::now();
            if now >= deadline {
                return PopOutcome::TimedOut;
            }
            if backoff.is_completed() {
                thread::sleep(IDLE_NAP.min(deadline - now));
            } else {
                backoff.snooze();
            }
        }
    }

    fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Release);
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Acquire)
    }
}
