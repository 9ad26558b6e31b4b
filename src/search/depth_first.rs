//! Single-threaded depth-first search over an explicit stack.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, info};

use crate::game::game_trait::{Game, GameHistory};
use crate::search::frontier::{Frontier, StackFrontier};
use crate::search::search_engine_trait::SearchEngine;
use crate::search::search_errors::SearchResult;
use crate::search::search_kernel::SearchKernel;
use crate::search::statistics::StatisticsSnapshot;
use crate::search::threading::{SearchStrategy, SharedSearchState};
use crate::search::win_collection::{WinCollection, WinSink};

pub struct DepthFirstSearch<G: Game> {
    kernel: SearchKernel<G>,
    initial: GameHistory<G>,
    shared: SharedSearchState,
    wins: WinCollection<GameHistory<G>>,
    // Published after every expansion so statistics can be read from another
    // thread while the stack itself stays local to `search`.
    frontier_len: AtomicUsize,
    started: AtomicBool,
}

impl<G: Game> DepthFirstSearch<G> {
    pub fn new(game: Arc<G>, initial: GameHistory<G>) -> Self {
        Self {
            kernel: SearchKernel::new(game),
            initial,
            shared: SharedSearchState::new(),
            wins: WinCollection::new(),
            frontier_len: AtomicUsize::new(0),
            started: AtomicBool::new(false),
        }
    }

    fn run(&self, stack: &StackFrontier<GameHistory<G>>) -> SearchResult<()> {
        self.kernel.expand_root(self.initial.clone(), stack, &self.wins)?;
        self.frontier_len.store(stack.len(), Ordering::Relaxed);
        while let Some(history) = stack.pop() {
            if self.shared.should_stop() {
                stack.push(history);
                debug!("depth-first search cancelled with {} queued", stack.len());
                return Ok(());
            }
            self.kernel.examine_node(history, stack, &self.wins)?;
            self.frontier_len.store(stack.len(), Ordering::Relaxed);
        }
        self.shared.mark_exhausted();
        Ok(())
    }
}

impl<G: Game> SearchEngine<G> for DepthFirstSearch<G> {
    fn search(&self) -> SearchResult<Vec<GameHistory<G>>> {
        if self.started.swap(true, Ordering::AcqRel) || self.shared.should_stop() {
            return Ok(self.wins.snapshot());
        }
        info!("starting {} search", self.strategy());

        let stack = StackFrontier::new();
        let outcome = self.run(&stack);
        self.frontier_len.store(stack.len(), Ordering::Relaxed);
        outcome?;

        info!(
            "{} search finished: {} wins, {} states examined",
            self.strategy(),
            self.wins.win_count(),
            self.kernel.statistics().game_states_examined()
        );
        Ok(self.wins.snapshot())
    }

    fn cancel(&self) {
        self.shared.request_stop();
    }

    fn strategy(&self) -> SearchStrategy {
        SearchStrategy::DepthFirst
    }

    fn is_exhausted(&self) -> bool {
        self.shared.is_exhausted()
    }

    fn statistics(&self) -> StatisticsSnapshot<G::FilterKey> {
        self.kernel
            .snapshot(self.frontier_len.load(Ordering::Relaxed), self.wins.win_count())
    }
}
