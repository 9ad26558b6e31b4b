//! Engine abstraction so callers can pick a traversal strategy at runtime
//! behind a single trait object.

use std::io;

use crate::game::game_trait::{Game, GameHistory};
use crate::search::search_errors::SearchResult;
use crate::search::statistics::StatisticsSnapshot;
use crate::search::threading::SearchStrategy;

pub trait SearchEngine<G: Game>: Send + Sync {
    /// Run until the tree is exhausted, the search is cancelled or a worker
    /// fails. Returns every winning history found, most recent state first
    /// in each history.
    ///
    /// An engine searches once. Calling `search` again (or after `cancel`)
    /// returns the wins already collected without doing further work.
    fn search(&self) -> SearchResult<Vec<GameHistory<G>>>;

    /// Request cooperative shutdown. Safe to call from any thread, at any
    /// time; workers stop at their next loop iteration.
    fn cancel(&self);

    /// Alias of [`SearchEngine::cancel`].
    fn close(&self) {
        self.cancel();
    }

    fn strategy(&self) -> SearchStrategy;

    /// True when the last run visited the whole (unpruned) tree.
    fn is_exhausted(&self) -> bool;

    fn statistics(&self) -> StatisticsSnapshot<G::FilterKey>;

    fn print_statistics(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        self.statistics().write_report(sink)
    }
}
