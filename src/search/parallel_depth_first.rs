//! Worker-pool depth-first search.
//!
//! N threads share one [`BlockingDeque`]; each pops the most recently pushed
//! history, so a worker tends to continue down the branch it just expanded
//! while peers pick up siblings. No global order is guaranteed across
//! workers, only exhaustive coverage of the unpruned tree.

use std::sync::Arc;

use crate::game::game_trait::{Game, GameHistory};
use crate::search::blocking_deque::BlockingDeque;
use crate::search::threading::{SearchConfig, SearchStrategy};
use crate::search::worker_pool::WorkerPoolSearch;

pub type ParallelDepthFirstSearch<G> = WorkerPoolSearch<G, BlockingDeque<GameHistory<G>>>;

impl<G: Game> WorkerPoolSearch<G, BlockingDeque<GameHistory<G>>> {
    pub fn new(game: Arc<G>, initial: GameHistory<G>, threads: usize) -> Self {
        Self::with_config(game, initial, SearchConfig::default().with_threads(threads))
    }

    pub fn with_config(game: Arc<G>, initial: GameHistory<G>, config: SearchConfig) -> Self {
        Self::with_frontier(
            game,
            initial,
            config.with_strategy(SearchStrategy::ParallelDepthFirst),
            "dfs-worker",
            BlockingDeque::new(),
        )
    }
}
