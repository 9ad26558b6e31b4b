//! Offline self-checks for rules collaborators.
//!
//! Validators are not consulted on the search hot path. A rules collaborator
//! uses them in its own tests (or before starting a search) to assert domain
//! invariants of boards and histories.

use thiserror::Error;

use crate::history::search_state::History;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid state: {0}")]
    Invalid(String),

    /// A board inside a history failed validation. `depth` counts from the
    /// root (depth 0 is the initial board).
    #[error("invalid board at depth {depth}: {reason}")]
    InvalidHistoryEntry { depth: usize, reason: String },
}

pub trait Validator<T: ?Sized> {
    fn validate(&self, value: &T) -> Result<(), ValidationError>;
}

impl<T: ?Sized, F> Validator<T> for F
where
    F: Fn(&T) -> Result<(), ValidationError>,
{
    fn validate(&self, value: &T) -> Result<(), ValidationError> {
        self(value)
    }
}

/// Validate every board of `history`, reporting the shallowest failure.
pub fn validate_history<M, B, V>(validator: &V, history: &History<M, B>) -> Result<(), ValidationError>
where
    V: Validator<B> + ?Sized,
{
    let mut first_failure = None;
    for (offset, state) in history.iter().enumerate() {
        if let Err(err) = validator.validate(state.board()) {
            // Walking most-recent-first, so later failures are shallower.
            first_failure = Some((history.len() - 1 - offset, err));
        }
    }
    match first_failure {
        None => Ok(()),
        Some((depth, ValidationError::Invalid(reason))) => {
            Err(ValidationError::InvalidHistoryEntry { depth, reason })
        }
        Some((depth, ValidationError::InvalidHistoryEntry { reason, .. })) => {
            Err(ValidationError::InvalidHistoryEntry { depth, reason })
        }
    }
}
