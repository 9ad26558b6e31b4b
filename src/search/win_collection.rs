//! Append-only, thread-safe collection of winning histories.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Destination for winning histories found by the kernel.
pub trait WinSink<T> {
    fn record_win(&self, item: T);

    fn win_count(&self) -> usize;
}

#[derive(Debug)]
pub struct WinCollection<T> {
    wins: Mutex<Vec<T>>,
}

impl<T> Default for WinCollection<T> {
    fn default() -> Self {
        Self {
            wins: Mutex::new(Vec::new()),
        }
    }
}

impl<T> WinCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.wins.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the wins recorded so far, in recording order.
    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.lock().clone()
    }
}

impl<T> WinSink<T> for WinCollection<T> {
    fn record_win(&self, item: T) {
        self.lock().push(item);
    }

    fn win_count(&self) -> usize {
        self.lock().len()
    }
}
