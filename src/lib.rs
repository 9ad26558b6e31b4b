//! Crate root module declarations for the exhaustive game-tree search engine.
//!
//! This file exposes the top-level subsystems (persistent histories, the game
//! rules contracts, the search strategies, and small utility helpers) so
//! games, tests, and benches can import stable module paths.

pub mod history {
    pub mod persistent_list;
    pub mod search_state;
}

pub mod game {
    pub mod game_trait;
    pub mod validator;
}

pub mod search {
    pub mod blocking_deque;
    pub mod depth_first;
    pub mod executor_breadth_first;
    pub mod fifo_frontier;
    pub mod frontier;
    pub mod parallel_breadth_first;
    pub mod parallel_depth_first;
    pub mod search_builder;
    pub mod search_engine_trait;
    pub mod search_errors;
    pub mod search_kernel;
    pub mod statistics;
    #[cfg(test)]
    pub(crate) mod test_games;
    pub mod threading;
    pub mod win_collection;
    pub mod worker_pool;
}

pub mod utils {
    pub mod pair;
}
