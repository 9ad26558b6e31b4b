//! Small rules collaborators shared by the unit tests of the search engines.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::game::game_trait::{FilterList, Game, GameMove, PredicateFilter, RuleError, RuleResult};
use crate::history::search_state::History;

/// Board `k`, one move that decrements it, win at zero.
#[derive(Debug, Clone, Default)]
pub struct CounterGame {
    pub always_prune: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decrement;

impl GameMove for Decrement {
    type Board = u32;

    fn apply(&self, board: &u32) -> RuleResult<u32> {
        board
            .checked_sub(1)
            .ok_or_else(|| RuleError::incompatible(self, "board is already zero"))
    }
}

impl Game for CounterGame {
    type Board = u32;
    type Move = Decrement;
    type FilterKey = &'static str;

    fn is_win(&self, history: &History<Decrement, u32>) -> bool {
        *history.board() == 0
    }

    fn find_all_moves(&self, history: &History<Decrement, u32>) -> RuleResult<Vec<Decrement>> {
        Ok(if *history.board() > 0 { vec![Decrement] } else { Vec::new() })
    }

    fn filters(&self) -> FilterList<Decrement, u32, &'static str> {
        if self.always_prune {
            vec![Box::new(PredicateFilter::new("always", |_: &History<Decrement, u32>| true))]
        } else {
            Vec::new()
        }
    }
}

/// Pay off `target` using coins of the given denominations, one coin per
/// move. Every ordered way of reaching exactly zero is a win; a remainder
/// smaller than every coin is a dead end.
#[derive(Debug, Clone)]
pub struct CoinGame {
    pub coins: Vec<u32>,
    /// Forbid playing the same coin twice in a row (filter key "repeat").
    pub forbid_repeats: bool,
    /// Veto any state whose remainder is in this set.
    pub vetoed_remainders: BTreeSet<u32>,
}

impl CoinGame {
    pub fn new(coins: &[u32]) -> Self {
        Self {
            coins: coins.to_vec(),
            forbid_repeats: false,
            vetoed_remainders: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pay(pub u32);

impl GameMove for Pay {
    type Board = u32;

    fn apply(&self, board: &u32) -> RuleResult<u32> {
        board
            .checked_sub(self.0)
            .ok_or_else(|| RuleError::incompatible(self, format!("only {board} left")))
    }
}

impl Game for CoinGame {
    type Board = u32;
    type Move = Pay;
    type FilterKey = &'static str;

    fn is_win(&self, history: &History<Pay, u32>) -> bool {
        *history.board() == 0
    }

    fn find_all_moves(&self, history: &History<Pay, u32>) -> RuleResult<Vec<Pay>> {
        let remaining = *history.board();
        Ok(self
            .coins
            .iter()
            .filter(|&&coin| coin <= remaining)
            .map(|&coin| Pay(coin))
            .collect())
    }

    fn prune_game_state(&self, candidate: History<Pay, u32>) -> Option<History<Pay, u32>> {
        if self.vetoed_remainders.contains(candidate.board()) {
            None
        } else {
            Some(candidate)
        }
    }

    fn filters(&self) -> FilterList<Pay, u32, &'static str> {
        if !self.forbid_repeats {
            return Vec::new();
        }
        vec![Box::new(PredicateFilter::new("repeat", |h: &History<Pay, u32>| {
            match (h.first().applied_move(), h.rest().and_then(|r| r.first().applied_move())) {
                (Some(last), Some(previous)) => last == previous,
                _ => false,
            }
        }))]
    }
}

/// Counter game whose rules fail once the board reaches `fail_at`.
#[derive(Debug, Clone)]
pub struct FaultyGame {
    pub fail_at: u32,
    pub panic_instead: bool,
}

impl Game for FaultyGame {
    type Board = u32;
    type Move = Decrement;
    type FilterKey = &'static str;

    fn is_win(&self, history: &History<Decrement, u32>) -> bool {
        *history.board() == 0
    }

    fn find_all_moves(&self, history: &History<Decrement, u32>) -> RuleResult<Vec<Decrement>> {
        if *history.board() == self.fail_at {
            if self.panic_instead {
                panic!("rules exploded at {}", self.fail_at);
            }
            return Err(RuleError::InvalidState(format!("cannot expand {}", self.fail_at)));
        }
        Ok(if *history.board() > 0 { vec![Decrement] } else { Vec::new() })
    }
}

/// Counter game that records how often its filter list is requested.
#[derive(Debug, Default)]
pub struct FilterCountingGame {
    pub filter_calls: AtomicUsize,
}

impl Game for FilterCountingGame {
    type Board = u32;
    type Move = Decrement;
    type FilterKey = &'static str;

    fn is_win(&self, history: &History<Decrement, u32>) -> bool {
        *history.board() == 0
    }

    fn find_all_moves(&self, history: &History<Decrement, u32>) -> RuleResult<Vec<Decrement>> {
        Ok(if *history.board() > 0 { vec![Decrement] } else { Vec::new() })
    }

    fn filters(&self) -> FilterList<Decrement, u32, &'static str> {
        self.filter_calls.fetch_add(1, Ordering::SeqCst);
        vec![Box::new(PredicateFilter::new("never", |_: &History<Decrement, u32>| false))]
    }
}

/// Chronological boards of every win, sorted, for order-independent
/// comparison across strategies.
pub fn sorted_boards<M, B: Clone + Ord>(wins: &[History<M, B>]) -> Vec<Vec<B>> {
    let mut all: Vec<Vec<B>> = wins.iter().map(|h| h.boards_chronological()).collect();
    all.sort();
    all
}
