//! Contracts a rules collaborator implements so the engine can search its
//! game.
//!
//! The engine never looks inside a board. It asks the [`Game`] for the legal
//! moves of a history, applies each [`GameMove`] to the current board, runs
//! the game's [`MoveFilter`]s on the resulting candidate and finally consults
//! [`Game::prune_game_state`] and [`Game::is_win`] to decide whether the
//! candidate is discarded, recorded as a win or queued for expansion.

use std::fmt;
use std::hash::Hash;

use thiserror::Error;

use crate::history::search_state::History;

pub type RuleResult<T> = Result<T, RuleError>;

/// Failure raised by a rules collaborator that could not uphold its contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// A move was applied to a board it cannot be played on.
    #[error("move `{mv}` cannot be applied: {reason}")]
    IncompatibleBoard { mv: String, reason: String },

    #[error("invalid game state: {0}")]
    InvalidState(String),
}

impl RuleError {
    pub fn incompatible(mv: impl fmt::Debug, reason: impl Into<String>) -> Self {
        Self::IncompatibleBoard {
            mv: format!("{mv:?}"),
            reason: reason.into(),
        }
    }
}

/// A pure transition from one board to the next.
pub trait GameMove: fmt::Debug + Clone + Send + Sync + 'static {
    type Board;

    fn apply(&self, board: &Self::Board) -> RuleResult<Self::Board>;
}

/// Veto applied to a candidate history before it is queued or counted as a
/// win.
pub trait MoveFilter<M, B>: Send + Sync {
    type Key;

    /// Key under which this filter's pruned candidates are counted. Filters
    /// sharing a key share a counter.
    fn statistics_key(&self) -> Self::Key;

    fn should_filter(&self, candidate: &History<M, B>) -> bool;
}

/// Boxed filter list as returned by [`Game::filters`].
pub type FilterList<M, B, K> = Vec<Box<dyn MoveFilter<M, B, Key = K>>>;

/// History type used by game `G`.
pub type GameHistory<G> = History<<G as Game>::Move, <G as Game>::Board>;

/// Rules of a searchable game.
pub trait Game: Send + Sync + 'static {
    type Board: fmt::Debug + Clone + Send + Sync + 'static;
    type Move: GameMove<Board = Self::Board>;
    type FilterKey: Clone + Eq + Hash + fmt::Display + fmt::Debug + Send + Sync + 'static;

    /// Whether the most recent board of `history` is a terminal win.
    fn is_win(&self, history: &History<Self::Move, Self::Board>) -> bool;

    /// All legal moves from the current board. The whole history is supplied
    /// so games can reject moves that would revisit an earlier board.
    fn find_all_moves(&self, history: &History<Self::Move, Self::Board>) -> RuleResult<Vec<Self::Move>>;

    /// Single-state hook run after the filters accept a candidate. `None`
    /// drops the candidate; `Some` continues the search with the returned
    /// history, which may differ from the one supplied.
    fn prune_game_state(
        &self,
        candidate: History<Self::Move, Self::Board>,
    ) -> Option<History<Self::Move, Self::Board>> {
        Some(candidate)
    }

    /// Ordered move filters. Queried once, when an engine is constructed.
    fn filters(&self) -> FilterList<Self::Move, Self::Board, Self::FilterKey> {
        Vec::new()
    }
}

/// Adapts a plain predicate over a history into a keyed [`MoveFilter`].
pub struct PredicateFilter<K, F> {
    key: K,
    predicate: F,
}

impl<K, F> PredicateFilter<K, F> {
    pub fn new(key: K, predicate: F) -> Self {
        Self { key, predicate }
    }
}

impl<M, B, K, F> MoveFilter<M, B> for PredicateFilter<K, F>
where
    K: Clone + Send + Sync,
    F: Fn(&History<M, B>) -> bool + Send + Sync,
{
    type Key = K;

    fn statistics_key(&self) -> K {
        self.key.clone()
    }

    fn should_filter(&self, candidate: &History<M, B>) -> bool {
        (self.predicate)(candidate)
    }
}
