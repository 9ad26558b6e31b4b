//! Threading configuration and shared control state for search engines.
//!
//! `SearchConfig` selects the traversal strategy and sizes the worker pool.
//! Options can be set programmatically or through the string interface
//! `set_option(name, value)` so drivers can forward user-supplied settings
//! without knowing the option types.
//!
//! `SharedSearchState` is the only control block shared between workers: a
//! cooperative stop flag plus the pending-work counter used to detect that
//! a parallel search has exhausted its tree.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use log::warn;

use crate::search::search_errors::{SearchError, SearchResult};

/// Traversal strategy of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchStrategy {
    /// Single thread, explicit LIFO stack.
    DepthFirst,
    /// Worker threads sharing a blocking double-ended queue, popping LIFO.
    ParallelDepthFirst,
    /// Worker threads sharing a lock-free FIFO queue.
    ParallelBreadthFirst,
    /// Thread pool where every node is examined by its own submitted task.
    ExecutorBreadthFirst,
}

impl SearchStrategy {
    pub const ALL: [SearchStrategy; 4] = [
        SearchStrategy::DepthFirst,
        SearchStrategy::ParallelDepthFirst,
        SearchStrategy::ParallelBreadthFirst,
        SearchStrategy::ExecutorBreadthFirst,
    ];

    pub fn option_name(self) -> &'static str {
        match self {
            SearchStrategy::DepthFirst => "DepthFirst",
            SearchStrategy::ParallelDepthFirst => "ParallelDepthFirst",
            SearchStrategy::ParallelBreadthFirst => "ParallelBreadthFirst",
            SearchStrategy::ExecutorBreadthFirst => "ExecutorBreadthFirst",
        }
    }

    #[inline]
    pub fn is_parallel(self) -> bool {
        !matches!(self, SearchStrategy::DepthFirst)
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_name())
    }
}

impl FromStr for SearchStrategy {
    type Err = SearchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SearchStrategy::ALL
            .into_iter()
            .find(|s| s.option_name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| SearchError::InvalidOptionValue {
                name: "Strategy".to_owned(),
                value: value.to_owned(),
            })
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub strategy: SearchStrategy,
    pub requested_threads: usize,
    /// How often the supervising thread wakes to report progress and check
    /// for cancellation.
    pub poll_interval: Duration,
    /// Bounded wait of a worker whose pop found the frontier empty.
    pub idle_wait: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::DepthFirst,
            requested_threads: 1,
            poll_interval: Duration::from_secs(1),
            idle_wait: Duration::from_secs(1),
        }
    }
}

impl SearchConfig {
    #[inline]
    pub fn normalized_threads(self) -> usize {
        self.requested_threads.max(1)
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.requested_threads = threads;
        self
    }

    /// Set an option by name. Names are matched case-insensitively.
    ///
    /// Supported: `Threads`, `Strategy`, `PollIntervalMs`, `IdleWaitMs`.
    pub fn set_option(&mut self, name: &str, value: &str) -> SearchResult<()> {
        let invalid = || SearchError::InvalidOptionValue {
            name: name.to_owned(),
            value: value.to_owned(),
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "threads" => {
                let threads: usize = value.trim().parse().map_err(|_| invalid())?;
                if threads == 0 {
                    warn!("Threads=0 requested, running with a single worker");
                }
                self.requested_threads = threads;
            }
            "strategy" => {
                self.strategy = value.parse()?;
            }
            "pollintervalms" => {
                let ms: u64 = value.trim().parse().map_err(|_| invalid())?;
                self.poll_interval = Duration::from_millis(ms.max(1));
            }
            "idlewaitms" => {
                let ms: u64 = value.trim().parse().map_err(|_| invalid())?;
                self.idle_wait = Duration::from_millis(ms.max(1));
            }
            _ => return Err(SearchError::UnknownOption(name.to_owned())),
        }
        Ok(())
    }
}

/// Per-worker bookkeeping, returned to the supervisor when a worker exits.
#[derive(Debug, Clone)]
pub struct WorkerThreadContext {
    pub worker_id: usize,
    pub nodes_local: u64,
    pub idle_waits: u64,
}

impl WorkerThreadContext {
    #[inline]
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            nodes_local: 0,
            idle_waits: 0,
        }
    }
}

/// Cancellation flag and work accounting shared by every worker of a run.
///
/// `pending` counts histories that are queued or being examined. A worker
/// pushes children before it marks its own node finished, so the counter can
/// only reach zero once the frontier is empty and no worker is busy.
#[derive(Debug, Default)]
pub struct SharedSearchState {
    stop: AtomicBool,
    exhausted: AtomicBool,
    pending: AtomicUsize,
    working: AtomicUsize,
}

impl SharedSearchState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    #[inline]
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// True once the tree was searched to the end (as opposed to cancelled).
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::Acquire)
    }

    pub fn mark_exhausted(&self) {
        self.exhausted.store(true, Ordering::Release);
        self.request_stop();
    }

    #[inline]
    pub fn node_queued(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
    }

    /// Returns true when this call retired the last pending node.
    #[inline]
    pub fn node_finished(&self) -> bool {
        self.pending.fetch_sub(1, Ordering::AcqRel) == 1
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    #[inline]
    pub fn mark_working(&self) {
        self.working.fetch_add(1, Ordering::AcqRel);
    }

    #[inline]
    pub fn mark_idle(&self) {
        self.working.fetch_sub(1, Ordering::AcqRel);
    }

    #[inline]
    pub fn working(&self) -> usize {
        self.working.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_normalizes_threads() {
        let cfg = SearchConfig::default().with_threads(0);
        assert_eq!(cfg.normalized_threads(), 1);
        assert_eq!(SearchConfig::default().with_threads(6).normalized_threads(), 6);
    }

    #[test]
    fn set_option_parses_known_options() {
        let mut cfg = SearchConfig::default();
        cfg.set_option("Threads", "4").expect("threads");
        cfg.set_option("strategy", "parallelbreadthfirst").expect("strategy");
        cfg.set_option("PollIntervalMs", "25").expect("poll");
        cfg.set_option("IdleWaitMs", "0").expect("idle");

        assert_eq!(cfg.requested_threads, 4);
        assert_eq!(cfg.strategy, SearchStrategy::ParallelBreadthFirst);
        assert_eq!(cfg.poll_interval, Duration::from_millis(25));
        assert_eq!(cfg.idle_wait, Duration::from_millis(1));
    }

    #[test]
    fn set_option_rejects_bad_input() {
        let mut cfg = SearchConfig::default();
        assert!(matches!(
            cfg.set_option("Hash", "64"),
            Err(SearchError::UnknownOption(name)) if name == "Hash"
        ));
        assert!(matches!(
            cfg.set_option("Threads", "lots"),
            Err(SearchError::InvalidOptionValue { .. })
        ));
        assert!(matches!(
            cfg.set_option("Strategy", "Minimax"),
            Err(SearchError::InvalidOptionValue { .. })
        ));
        assert_eq!(cfg, SearchConfig::default());
    }

    #[test]
    fn strategy_names_round_trip() {
        for strategy in SearchStrategy::ALL {
            assert_eq!(strategy.to_string().parse::<SearchStrategy>().expect("parse"), strategy);
        }
        assert!(!SearchStrategy::DepthFirst.is_parallel());
        assert!(SearchStrategy::ExecutorBreadthFirst.is_parallel());
    }

    #[test]
    fn shared_state_tracks_pending_work() {
        let state = SharedSearchState::new();
        state.node_queued();
        state.node_queued();
        assert_eq!(state.pending(), 2);
        assert!(!state.node_finished());
        assert!(state.node_finished());
        assert_eq!(state.pending(), 0);

        assert!(!state.should_stop());
        state.mark_exhausted();
        assert!(state.should_stop());
        assert!(state.is_exhausted());
    }

    #[test]
    fn cancel_is_not_exhaustion() {
        let state = SharedSearchState::new();
        state.request_stop();
        assert!(state.should_stop());
        assert!(!state.is_exhausted());

        state.mark_working();
        assert_eq!(state.working(), 1);
        state.mark_idle();
        assert_eq!(state.working(), 0);
    }
}
