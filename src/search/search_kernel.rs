//! Node expansion shared by every search strategy.
//!
//! The kernel owns the game, its filters (queried once, at construction) and
//! the statistics. Strategies differ only in the frontier and win sink they
//! hand to [`SearchKernel::examine_node`].
//!
//! Expansion of one history:
//! 1. count the history as examined;
//! 2. ask the game for every legal move;
//! 3. apply each move to the current board, count the generated board and
//!    cons the new record onto the history to form a candidate;
//! 4. run the filters in declaration order; the first match prunes the
//!    candidate;
//! 5. pass survivors through `Game::prune_game_state`, which may veto or
//!    replace them;
//! 6. record winning candidates (a win counts as examined, since the win
//!    test is its examination) and push the rest onto the frontier.
//!
//! The initial history is expanded like any other node but never tested for
//! a win: only boards produced by a move can win. Engines expand it on the
//! calling thread before any worker starts, so the frontier only ever holds
//! generated boards.

use std::sync::Arc;

use crate::game::game_trait::{FilterList, Game, GameHistory, GameMove};
use crate::search::frontier::Frontier;
use crate::search::search_errors::SearchResult;
use crate::search::statistics::{SearchStatistics, StatisticsSnapshot};
use crate::search::win_collection::WinSink;

pub struct SearchKernel<G: Game> {
    game: Arc<G>,
    filters: FilterList<G::Move, G::Board, G::FilterKey>,
    statistics: SearchStatistics<G::FilterKey>,
}

impl<G: Game> SearchKernel<G> {
    pub fn new(game: Arc<G>) -> Self {
        let filters = game.filters();
        let statistics = SearchStatistics::new(filters.iter().map(|f| f.statistics_key()));
        Self {
            game,
            filters,
            statistics,
        }
    }

    #[inline]
    pub fn game(&self) -> &G {
        &self.game
    }

    #[inline]
    pub fn statistics(&self) -> &SearchStatistics<G::FilterKey> {
        &self.statistics
    }

    pub fn snapshot(&self, frontier_size: usize, win_count: usize) -> StatisticsSnapshot<G::FilterKey> {
        self.statistics.snapshot(frontier_size, win_count)
    }

    /// Start a run: restart the statistics clock and expand the initial
    /// history into `frontier`.
    pub fn expand_root<F, W>(&self, initial: GameHistory<G>, frontier: &F, wins: &W) -> SearchResult<()>
    where
        F: Frontier<GameHistory<G>> + ?Sized,
        W: WinSink<GameHistory<G>> + ?Sized,
    {
        self.statistics.mark_search_started();
        self.examine_node(initial, frontier, wins)
    }

    /// Expand one history popped from the frontier.
    pub fn examine_node<F, W>(&self, history: GameHistory<G>, frontier: &F, wins: &W) -> SearchResult<()>
    where
        F: Frontier<GameHistory<G>> + ?Sized,
        W: WinSink<GameHistory<G>> + ?Sized,
    {
        self.statistics.record_examined();
        let moves = self.game.find_all_moves(&history)?;

        for mv in moves {
            let board = mv.apply(history.board())?;
            self.statistics.record_board_generated();
            let candidate = history.advance(mv, board);

            if let Some(filter_index) = self.matching_filter(&candidate) {
                self.statistics.record_pruned(filter_index);
                continue;
            }

            match self.game.prune_game_state(candidate) {
                Some(candidate) => self.offer(candidate, frontier, wins),
                None => self.statistics.record_vetoed(),
            }
        }
        Ok(())
    }

    fn matching_filter(&self, candidate: &GameHistory<G>) -> Option<usize> {
        self.filters.iter().position(|f| f.should_filter(candidate))
    }

    fn offer<F, W>(&self, candidate: GameHistory<G>, frontier: &F, wins: &W)
    where
        F: Frontier<GameHistory<G>> + ?Sized,
        W: WinSink<GameHistory<G>> + ?Sized,
    {
        if self.game.is_win(&candidate) {
            self.statistics.record_examined();
            wins.record_win(candidate);
        } else {
            frontier.push(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::search_state::History;
    use crate::search::frontier::StackFrontier;
    use crate::search::search_errors::SearchError;
    use crate::search::test_games::{CoinGame, CounterGame, Decrement, FaultyGame, Pay};
    use crate::search::win_collection::WinCollection;

    #[test]
    fn filter_counters_start_at_zero() {
        let kernel = SearchKernel::new(Arc::new(CounterGame { always_prune: true }));
        let snap = kernel.snapshot(0, 0);
        assert_eq!(snap.pruned_for(&"always"), Some(0));
        assert_eq!(snap.pruned_by_filter.len(), 1);
    }

    #[test]
    fn examine_counts_every_generated_board() {
        let kernel = SearchKernel::new(Arc::new(CoinGame::new(&[1, 2, 5])));
        let frontier = StackFrontier::new();
        let wins = WinCollection::new();

        kernel
            .examine_node(History::from_initial_board(2), &frontier, &wins)
            .expect("expand");

        let snap = kernel.snapshot(frontier.len(), wins.win_count());
        assert_eq!(snap.game_states_examined, 2);
        assert_eq!(snap.boards_generated, 2);
        assert_eq!(frontier.len(), 1);
        assert_eq!(wins.win_count(), 1);
        let queued = frontier.pop().expect("queued child");
        assert_eq!(queued.boards_chronological(), vec![2, 1]);
    }

    #[test]
    fn first_matching_filter_prunes_candidate() {
        let mut game = CoinGame::new(&[1]);
        game.forbid_repeats = true;
        let kernel = SearchKernel::new(Arc::new(game));
        let frontier = StackFrontier::new();
        let wins = WinCollection::new();

        let after_one = History::from_initial_board(3).advance(Pay(1), 2);
        kernel.examine_node(after_one, &frontier, &wins).expect("expand");

        let snap = kernel.snapshot(frontier.len(), wins.win_count());
        assert_eq!(snap.boards_generated, 1);
        assert_eq!(snap.moves_pruned, 1);
        assert_eq!(snap.pruned_for(&"repeat"), Some(1));
        assert!(frontier.is_empty());
        assert_eq!(wins.win_count(), 0);
    }

    #[test]
    fn state_hook_can_veto_candidates() {
        let mut game = CoinGame::new(&[1, 2]);
        game.vetoed_remainders.insert(2);
        let kernel = SearchKernel::new(Arc::new(game));
        let frontier = StackFrontier::new();
        let wins = WinCollection::new();

        kernel
            .examine_node(History::from_initial_board(3), &frontier, &wins)
            .expect("expand");

        let snap = kernel.snapshot(frontier.len(), wins.win_count());
        assert_eq!(snap.boards_generated, 2);
        assert_eq!(snap.states_vetoed, 1);
        assert_eq!(snap.moves_pruned, 0);
        assert_eq!(frontier.len(), 1);
        assert_eq!(*frontier.pop().expect("child").board(), 1);
    }

    #[test]
    fn winning_root_is_expanded_not_recorded() {
        let kernel = SearchKernel::new(Arc::new(CoinGame::new(&[1])));
        let frontier = StackFrontier::new();
        let wins = WinCollection::new();
        kernel
            .expand_root(History::from_initial_board(0), &frontier, &wins)
            .expect("expand");
        assert_eq!(wins.win_count(), 0);
        assert!(frontier.is_empty());
        assert_eq!(kernel.statistics().game_states_examined(), 1);
        assert_eq!(kernel.statistics().boards_generated(), 0);
    }

    #[test]
    fn root_expansion_leaves_only_generated_boards_queued() {
        let kernel = SearchKernel::new(Arc::new(CoinGame::new(&[1, 2, 3])));
        let frontier = StackFrontier::new();
        let wins = WinCollection::new();
        kernel
            .expand_root(History::from_initial_board(3), &frontier, &wins)
            .expect("expand");
        let snap = kernel.snapshot(frontier.len(), wins.win_count());
        assert_eq!(snap.boards_generated, 3);
        assert_eq!(snap.frontier_size, 2);
        assert_eq!(snap.win_count, 1);
        assert!(snap.moves_pruned + snap.win_count as u64 + snap.frontier_size as u64 <= snap.boards_generated);
    }

    #[test]
    fn rule_failures_propagate() {
        let kernel = SearchKernel::new(Arc::new(FaultyGame {
            fail_at: 2,
            panic_instead: false,
        }));
        let frontier = StackFrontier::new();
        let wins = WinCollection::new();
        let err = kernel
            .examine_node(History::<Decrement, u32>::from_initial_board(2), &frontier, &wins)
            .expect_err("rules fail");
        assert!(matches!(err, SearchError::Rule(_)));
    }
}
