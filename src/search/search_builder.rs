//! Fluent construction of a search engine with the strategy chosen at runtime.

use std::sync::Arc;

use log::debug;

use crate::game::game_trait::{Game, GameHistory};
use crate::history::search_state::History;
use crate::search::depth_first::DepthFirstSearch;
use crate::search::executor_breadth_first::ExecutorBreadthFirstSearch;
use crate::search::parallel_breadth_first::ParallelBreadthFirstSearch;
use crate::search::parallel_depth_first::ParallelDepthFirstSearch;
use crate::search::search_engine_trait::SearchEngine;
use crate::search::search_errors::{SearchError, SearchResult};
use crate::search::threading::{SearchConfig, SearchStrategy};

/// Collects a game, an initial history and a [`SearchConfig`], then builds
/// the engine for the configured strategy.
///
/// ```ignore
/// let engine = SearchBuilder::new()
///     .game(MyGame::default())
///     .initial_board(start)
///     .set_option("Strategy", "ParallelBreadthFirst")?
///     .set_option("Threads", "8")?
///     .build()?;
/// let wins = engine.search()?;
/// ```
pub struct SearchBuilder<G: Game> {
    game: Option<Arc<G>>,
    initial: Option<GameHistory<G>>,
    config: SearchConfig,
}

impl<G: Game> Default for SearchBuilder<G> {
    fn default() -> Self {
        Self {
            game: None,
            initial: None,
            config: SearchConfig::default(),
        }
    }
}

impl<G: Game> SearchBuilder<G> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn game(self, game: G) -> Self {
        self.shared_game(Arc::new(game))
    }

    pub fn shared_game(mut self, game: Arc<G>) -> Self {
        self.game = Some(game);
        self
    }

    /// Start from a single-state history holding `board`.
    pub fn initial_board(self, board: G::Board) -> Self {
        self.initial_history(History::from_initial_board(board))
    }

    pub fn initial_history(mut self, history: GameHistory<G>) -> Self {
        self.initial = Some(history);
        self
    }

    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.config = self.config.with_threads(threads);
        self
    }

    pub fn strategy(mut self, strategy: SearchStrategy) -> Self {
        self.config = self.config.with_strategy(strategy);
        self
    }

    /// Forward a named option to the configuration.
    pub fn set_option(mut self, name: &str, value: &str) -> SearchResult<Self> {
        self.config.set_option(name, value)?;
        Ok(self)
    }

    pub fn current_config(&self) -> SearchConfig {
        self.config
    }

    pub fn build(self) -> SearchResult<Box<dyn SearchEngine<G>>> {
        let game = self.game.ok_or(SearchError::MissingGame)?;
        let initial = self.initial.ok_or(SearchError::MissingInitialHistory)?;
        let config = self.config;
        debug!(
            "building {} engine with {} threads",
            config.strategy,
            config.normalized_threads()
        );

        Ok(match config.strategy {
            SearchStrategy::DepthFirst => Box::new(DepthFirstSearch::new(game, initial)),
            SearchStrategy::ParallelDepthFirst => {
                Box::new(ParallelDepthFirstSearch::with_config(game, initial, config))
            }
            SearchStrategy::ParallelBreadthFirst => {
                Box::new(ParallelBreadthFirstSearch::with_config(game, initial, config))
            }
            SearchStrategy::ExecutorBreadthFirst => {
                Box::new(ExecutorBreadthFirstSearch::with_config(game, initial, config))
            }
        })
    }
}
