#![allow(dead_code)]

use std::fmt;
use std::time::Duration;

use game_tree_search::game::game_trait::{FilterList, Game, GameMove, PredicateFilter, RuleError, RuleResult};
use game_tree_search::history::search_state::History;
use game_tree_search::search::search_builder::SearchBuilder;
use game_tree_search::search::search_engine_trait::SearchEngine;
use game_tree_search::search::threading::{SearchConfig, SearchStrategy};

/// Subtract one of the allowed step sizes from the remaining distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step(pub u32);

impl GameMove for Step {
    type Board = u32;

    fn apply(&self, board: &u32) -> RuleResult<u32> {
        board
            .checked_sub(self.0)
            .ok_or_else(|| RuleError::incompatible(self, format!("only {board} left")))
    }
}

/// Pruning rule of a [`StepGame`] filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRule {
    /// Prune when the remaining distance is `residue` modulo `modulus`
    /// (zero remainders are never pruned so the goal stays reachable).
    Residue { modulus: u32, residue: u32 },
    /// Prune histories longer than this many states.
    MaxLength(usize),
    /// Prune two equal steps in a row.
    NoRepeat,
}

impl FilterRule {
    pub fn matches(self, history: &History<Step, u32>) -> bool {
        match self {
            FilterRule::Residue { modulus, residue } => {
                let remaining = *history.board();
                remaining != 0 && remaining % modulus == residue
            }
            FilterRule::MaxLength(limit) => history.len() > limit,
            FilterRule::NoRepeat => match (
                history.first().applied_move(),
                history.rest().and_then(|rest| rest.first().applied_move()),
            ) {
                (Some(last), Some(previous)) => last == previous,
                _ => false,
            },
        }
    }
}

impl fmt::Display for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterRule::Residue { modulus, residue } => write!(f, "residue {residue} mod {modulus}"),
            FilterRule::MaxLength(limit) => write!(f, "longer than {limit}"),
            FilterRule::NoRepeat => write!(f, "repeated step"),
        }
    }
}

/// Walk a distance down to exactly zero with the given step sizes.
#[derive(Debug, Clone)]
pub struct StepGame {
    pub steps: Vec<u32>,
    pub rules: Vec<(String, FilterRule)>,
    /// Remainders rejected by the state hook after filtering.
    pub vetoed: Vec<u32>,
}

impl StepGame {
    pub fn new(steps: &[u32]) -> Self {
        Self {
            steps: steps.to_vec(),
            rules: Vec::new(),
            vetoed: Vec::new(),
        }
    }

    pub fn with_rule(mut self, key: &str, rule: FilterRule) -> Self {
        self.rules.push((key.to_owned(), rule));
        self
    }
}

impl Game for StepGame {
    type Board = u32;
    type Move = Step;
    type FilterKey = String;

    fn is_win(&self, history: &History<Step, u32>) -> bool {
        *history.board() == 0
    }

    fn find_all_moves(&self, history: &History<Step, u32>) -> RuleResult<Vec<Step>> {
        let remaining = *history.board();
        Ok(self
            .steps
            .iter()
            .copied()
            .filter(|&step| step <= remaining)
            .map(Step)
            .collect())
    }

    fn prune_game_state(&self, candidate: History<Step, u32>) -> Option<History<Step, u32>> {
        if self.vetoed.contains(candidate.board()) {
            None
        } else {
            Some(candidate)
        }
    }

    fn filters(&self) -> FilterList<Step, u32, String> {
        let mut filters: FilterList<Step, u32, String> = Vec::with_capacity(self.rules.len());
        for (key, rule) in &self.rules {
            let rule = *rule;
            filters.push(Box::new(PredicateFilter::new(key.clone(), move |h: &History<Step, u32>| {
                rule.matches(h)
            })));
        }
        filters
    }
}

pub fn quick_config(strategy: SearchStrategy, threads: usize) -> SearchConfig {
    SearchConfig {
        poll_interval: Duration::from_millis(10),
        idle_wait: Duration::from_millis(10),
        ..SearchConfig::default().with_strategy(strategy).with_threads(threads)
    }
}

pub fn engine_for(game: StepGame, start: u32, strategy: SearchStrategy, threads: usize) -> Box<dyn SearchEngine<StepGame>> {
    SearchBuilder::new()
        .game(game)
        .initial_board(start)
        .config(quick_config(strategy, threads))
        .build()
        .expect("engine should build")
}

/// Chronological step sequences of every win, sorted.
pub fn sorted_paths(wins: &[History<Step, u32>]) -> Vec<Vec<u32>> {
    let mut paths: Vec<Vec<u32>> = wins
        .iter()
        .map(|h| h.moves_chronological().into_iter().map(|Step(n)| n).collect())
        .collect();
    paths.sort();
    paths
}
