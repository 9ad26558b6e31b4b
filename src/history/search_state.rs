//! Search-state records and the history type built from them.
//!
//! A `SearchState` pairs the move that was applied with the board it
//! produced. Chains of records form a [`History`]: the current state sits at
//! the head of the list and the root state (which has no move) at its end.

use crate::history::persistent_list::PersistentList;

/// Immutable `(move, board)` record. The root record carries no move.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchState<M, B> {
    applied_move: Option<M>,
    board: B,
}

impl<M, B> SearchState<M, B> {
    /// Record for the position a search starts from.
    pub fn initial(board: B) -> Self {
        Self {
            applied_move: None,
            board,
        }
    }

    pub fn new(applied_move: M, board: B) -> Self {
        Self {
            applied_move: Some(applied_move),
            board,
        }
    }

    #[inline]
    pub fn applied_move(&self) -> Option<&M> {
        self.applied_move.as_ref()
    }

    #[inline]
    pub fn board(&self) -> &B {
        &self.board
    }

    #[inline]
    pub fn is_initial(&self) -> bool {
        self.applied_move.is_none()
    }
}

/// Most-recent-first chain of search states.
pub type History<M, B> = PersistentList<SearchState<M, B>>;

impl<M, B> PersistentList<SearchState<M, B>> {
    /// One-record history for a search that starts at `board`.
    pub fn from_initial_board(board: B) -> Self {
        Self::singleton(SearchState::initial(board))
    }

    /// Board of the most recent state.
    #[inline]
    pub fn board(&self) -> &B {
        self.first().board()
    }

    /// Extend this history by one step without copying it.
    #[inline]
    pub fn advance(&self, applied_move: M, board: B) -> Self {
        self.prepend(SearchState::new(applied_move, board))
    }

    /// Boards from the root to the current state.
    pub fn boards_chronological(&self) -> Vec<B>
    where
        B: Clone,
    {
        let mut boards: Vec<B> = self.iter().map(|state| state.board().clone()).collect();
        boards.reverse();
        boards
    }

    /// Moves from the first step to the current state; the root has none.
    pub fn moves_chronological(&self) -> Vec<M>
    where
        M: Clone,
    {
        let mut moves: Vec<M> = self
            .iter()
            .filter_map(|state| state.applied_move().cloned())
            .collect();
        moves.reverse();
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_record_has_no_move() {
        let history: History<char, u8> = History::from_initial_board(3);
        assert!(history.first().is_initial());
        assert_eq!(history.first().applied_move(), None);
        assert_eq!(*history.board(), 3);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn advance_keeps_parent_as_tail() {
        let root: History<char, u8> = History::from_initial_board(3);
        let child = root.advance('d', 2);
        let grandchild = child.advance('d', 1);

        assert_eq!(*grandchild.board(), 1);
        assert_eq!(grandchild.first().applied_move(), Some(&'d'));
        assert!(grandchild.rest().expect("tail").ptr_eq(&child));
        assert_eq!(grandchild.boards_chronological(), vec![3, 2, 1]);
        assert_eq!(grandchild.moves_chronological(), vec!['d', 'd']);
    }
}
