//! Worker-pool breadth-first search.
//!
//! Same worker pool as the depth-first variant, but the shared frontier is a
//! lock-free FIFO queue, so shallower histories are examined before deeper
//! ones (up to the interleaving of concurrent workers).

use std::sync::Arc;

use crate::game::game_trait::{Game, GameHistory};
use crate::search::fifo_frontier::FifoFrontier;
use crate::search::threading::{SearchConfig, SearchStrategy};
use crate::search::worker_pool::WorkerPoolSearch;

pub type ParallelBreadthFirstSearch<G> = WorkerPoolSearch<G, FifoFrontier<GameHistory<G>>>;

impl<G: Game> WorkerPoolSearch<G, FifoFrontier<GameHistory<G>>> {
    pub fn new(game: Arc<G>, initial: GameHistory<G>, threads: usize) -> Self {
        Self::with_config(game, initial, SearchConfig::default().with_threads(threads))
    }

    pub fn with_config(game: Arc<G>, initial: GameHistory<G>, config: SearchConfig) -> Self {
        Self::with_frontier(
            game,
            initial,
            config.with_strategy(SearchStrategy::ParallelBreadthFirst),
            "bfs-worker",
            FifoFrontier::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::history::search_state::History;
    use crate::search::depth_first::DepthFirstSearch;
    use crate::search::search_engine_trait::SearchEngine;
    use crate::search::search_errors::SearchError;
    use crate::search::test_games::{sorted_boards, CoinGame, CounterGame, FaultyGame};

    fn quick_config(threads: usize) -> SearchConfig {
        SearchConfig {
            poll_interval: Duration::from_millis(10),
            idle_wait: Duration::from_millis(10),
            ..SearchConfig::default().with_threads(threads)
        }
    }

    #[test]
    fn counter_game_from_three() {
        let engine = ParallelBreadthFirstSearch::with_config(
            Arc::new(CounterGame::default()),
            History::from_initial_board(3),
            quick_config(3),
        );
        let wins = engine.search().expect("search");

        assert_eq!(wins.len(), 1);
        assert_eq!(wins[0].boards_chronological(), vec![3, 2, 1, 0]);
        assert_eq!(engine.strategy(), SearchStrategy::ParallelBreadthFirst);
        assert!(engine.is_exhausted());

        let snap = engine.statistics();
        assert_eq!(snap.boards_generated, 3);
        assert_eq!(snap.game_states_examined, 4);
        assert_eq!(snap.win_count, 1);
    }

    #[test]
    fn matches_sequential_win_set_with_vetoes() {
        let mut game = CoinGame::new(&[1, 2, 3]);
        game.vetoed_remainders.insert(4);
        let game = Arc::new(game);

        let sequential = DepthFirstSearch::new(Arc::clone(&game), History::from_initial_board(8));
        let parallel = ParallelBreadthFirstSearch::with_config(game, History::from_initial_board(8), quick_config(4));

        let expected = sorted_boards(&sequential.search().expect("sequential"));
        let actual = sorted_boards(&parallel.search().expect("parallel"));
        assert!(!expected.is_empty());
        assert_eq!(actual, expected);
        assert_eq!(parallel.statistics().states_vetoed, sequential.statistics().states_vetoed);
    }

    #[test]
    fn single_worker_examines_shallow_states_first() {
        // With one worker the queue order is the examination order, so the
        // shortest payment (a single 3) is found before any longer one.
        let engine = ParallelBreadthFirstSearch::with_config(
            Arc::new(CoinGame::new(&[1, 3])),
            History::from_initial_board(3),
            quick_config(1),
        );
        let wins = engine.search().expect("search");
        assert_eq!(wins.len(), 2);
        assert_eq!(wins[0].len(), 2);
        assert_eq!(wins[1].len(), 4);
    }

    #[test]
    fn cancel_from_another_thread_stops_the_pool() {
        // Large enough that it cannot finish before the cancel lands.
        let engine = Arc::new(ParallelBreadthFirstSearch::with_config(
            Arc::new(CoinGame::new(&[1, 2])),
            History::from_initial_board(60),
            quick_config(4),
        ));

        let canceller = {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                engine.cancel();
            })
        };

        let started = Instant::now();
        engine.search().expect("cancelled search still returns wins");
        canceller.join().expect("canceller");

        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(!engine.is_exhausted());

        let examined = engine.statistics().game_states_examined;
        thread::sleep(Duration::from_millis(30));
        assert_eq!(engine.statistics().game_states_examined, examined);
    }

    #[test]
    fn worker_panic_is_surfaced() {
        let engine = ParallelBreadthFirstSearch::with_config(
            Arc::new(FaultyGame {
                fail_at: 2,
                panic_instead: true,
            }),
            History::from_initial_board(5),
            quick_config(3),
        );
        match engine.search() {
            Err(SearchError::WorkerPanicked { worker, message }) => {
                assert!(worker.starts_with("bfs-worker-"));
                assert!(message.contains("rules exploded at 2"));
            }
            other => panic!("expected a worker panic, got {other:?}"),
        }
    }
}
