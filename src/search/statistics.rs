//! Lock-free search counters and the statistics report.
//!
//! Counters are plain relaxed atomics: every worker bumps them on the hot
//! path and nothing synchronises through them. Per-filter counters are laid
//! out once, when the engine is built, with one slot per distinct statistics
//! key. Filters that share a key share a slot.

use std::cmp::Reverse;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Local};

use crate::utils::pair::{ComparablePair, Pair};

#[derive(Debug)]
pub struct SearchStatistics<K> {
    game_states_examined: AtomicU64,
    boards_generated: AtomicU64,
    moves_pruned: AtomicU64,
    states_vetoed: AtomicU64,
    filter_counts: Vec<Pair<K, AtomicU64>>,
    // filter index -> slot in `filter_counts`
    filter_slots: Vec<usize>,
    // Construction time until a search starts, then the start of that search.
    started_at: Mutex<DateTime<Local>>,
}

impl<K: Clone + PartialEq> SearchStatistics<K> {
    /// Build counters for filters whose statistics keys are given in
    /// declaration order.
    pub fn new(filter_keys: impl IntoIterator<Item = K>) -> Self {
        let mut filter_counts: Vec<Pair<K, AtomicU64>> = Vec::new();
        let mut filter_slots = Vec::new();
        for key in filter_keys {
            let slot = match filter_counts.iter().position(|p| *p.first() == key) {
                Some(slot) => slot,
                None => {
                    filter_counts.push(Pair::new(key, AtomicU64::new(0)));
                    filter_counts.len() - 1
                }
            };
            filter_slots.push(slot);
        }
        Self {
            game_states_examined: AtomicU64::new(0),
            boards_generated: AtomicU64::new(0),
            moves_pruned: AtomicU64::new(0),
            states_vetoed: AtomicU64::new(0),
            filter_counts,
            filter_slots,
            started_at: Mutex::new(Local::now()),
        }
    }

    /// Restart the clock reported as "search started" and "elapsed ms".
    pub fn mark_search_started(&self) {
        *self.started_at.lock().unwrap_or_else(PoisonError::into_inner) = Local::now();
    }

    #[inline]
    pub fn record_examined(&self) {
        self.game_states_examined.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_board_generated(&self) {
        self.boards_generated.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a candidate discarded by the filter at `filter_index`.
    #[inline]
    pub fn record_pruned(&self, filter_index: usize) {
        self.moves_pruned.fetch_add(1, Ordering::Relaxed);
        let slot = self.filter_slots[filter_index];
        self.filter_counts[slot].second().fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_vetoed(&self) {
        self.states_vetoed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn game_states_examined(&self) -> u64 {
        self.game_states_examined.load(Ordering::Relaxed)
    }

    pub fn boards_generated(&self) -> u64 {
        self.boards_generated.load(Ordering::Relaxed)
    }

    pub fn moves_pruned(&self) -> u64 {
        self.moves_pruned.load(Ordering::Relaxed)
    }

    pub fn started_at(&self) -> DateTime<Local> {
        *self.started_at.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy the counters together with the engine's current frontier size and
    /// win count.
    pub fn snapshot(&self, frontier_size: usize, win_count: usize) -> StatisticsSnapshot<K> {
        let started_at = self.started_at();
        StatisticsSnapshot {
            game_states_examined: self.game_states_examined(),
            boards_generated: self.boards_generated(),
            moves_pruned: self.moves_pruned(),
            states_vetoed: self.states_vetoed.load(Ordering::Relaxed),
            pruned_by_filter: self
                .filter_counts
                .iter()
                .map(|p| Pair::new(p.first().clone(), p.second().load(Ordering::Relaxed)))
                .collect(),
            frontier_size,
            win_count,
            started_at,
            elapsed_ms: (Local::now() - started_at).num_milliseconds().max(0),
        }
    }
}

/// Point-in-time copy of an engine's statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsSnapshot<K> {
    pub game_states_examined: u64,
    pub boards_generated: u64,
    pub moves_pruned: u64,
    pub states_vetoed: u64,
    /// One entry per distinct filter key, in declaration order.
    pub pruned_by_filter: Vec<Pair<K, u64>>,
    pub frontier_size: usize,
    pub win_count: usize,
    pub started_at: DateTime<Local>,
    pub elapsed_ms: i64,
}

impl<K: PartialEq> StatisticsSnapshot<K> {
    pub fn pruned_for(&self, key: &K) -> Option<u64> {
        self.pruned_by_filter
            .iter()
            .find(|p| p.first() == key)
            .map(|p| *p.second())
    }

    pub fn filter_pruned_total(&self) -> u64 {
        self.pruned_by_filter.iter().map(|p| *p.second()).sum()
    }
}

impl<K: std::fmt::Display> StatisticsSnapshot<K> {
    /// Write a human-readable report; filters are listed busiest first.
    pub fn write_report(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        writeln!(sink, "search started: {}", self.started_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(sink, "elapsed ms: {}", self.elapsed_ms)?;
        writeln!(sink, "game states examined: {}", self.game_states_examined)?;
        writeln!(sink, "boards generated: {}", self.boards_generated)?;
        writeln!(sink, "moves pruned: {}", self.moves_pruned)?;
        writeln!(sink, "states vetoed: {}", self.states_vetoed)?;

        let mut order: Vec<ComparablePair<Reverse<u64>, usize>> = self
            .pruned_by_filter
            .iter()
            .enumerate()
            .map(|(idx, p)| ComparablePair::new(Reverse(*p.second()), idx))
            .collect();
        order.sort();
        for entry in order {
            let filter = &self.pruned_by_filter[*entry.second()];
            writeln!(sink, "  pruned by {}: {}", filter.first(), filter.second())?;
        }

        writeln!(sink, "queue size: {}", self.frontier_size)?;
        writeln!(sink, "wins: {}", self.win_count)?;
        Ok(())
    }
}
