//! Errors returned by search engines.
//!
//! `SearchError` is the single error type of the search subsystem. It covers
//! three families of failure:
//! - configuration errors detected while building an engine (missing game or
//!   initial history, unknown or malformed options), reported before any
//!   search work starts;
//! - failures of the rules collaborator (`RuleError`) raised while a node was
//!   being expanded;
//! - infrastructure failures of worker threads (panics, spawn failures,
//!   thread-pool construction).
//!
//! Worker failures cancel the whole run and are returned from
//! `SearchEngine::search`; they are never swallowed by the worker that hit
//! them.

use thiserror::Error;

use crate::game::game_trait::RuleError;

pub type SearchResult<T> = Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no game was supplied to the search builder")]
    MissingGame,

    #[error("no initial history was supplied to the search builder")]
    MissingInitialHistory,

    #[error("unknown search option `{0}`")]
    UnknownOption(String),

    #[error("invalid value `{value}` for search option `{name}`")]
    InvalidOptionValue { name: String, value: String },

    #[error("rules collaborator failed: {0}")]
    Rule(#[from] RuleError),

    #[error("search worker {worker} panicked: {message}")]
    WorkerPanicked { worker: String, message: String },

    #[error("failed to spawn search worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("failed to build search thread pool: {0}")]
    ThreadPool(String),
}

impl SearchError {
    /// Convert a caught panic payload into a `WorkerPanicked` error.
    pub fn from_panic(worker: impl Into<String>, payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_owned()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_owned()
        };
        Self::WorkerPanicked {
            worker: worker.into(),
            message,
        }
    }
}
