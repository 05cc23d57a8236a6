use crate::action::Action;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error("invalid range [{begin}, {end}) in buffer of length {len}")]
    InvalidRange { begin: usize, end: usize, len: usize },
}

impl RewriteError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, RewriteError::Conflict(_))
    }
}

/// Misuse of the transaction state machine. Never recovered internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("cannot process edits while a transaction is open")]
    ProcessInTransaction,

    #[error("transactions cannot be nested")]
    NestedTransaction,
}

/// A scheduled edit clobbers a queued one and the two cannot be merged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("clobbering detected: cannot {action}; clobbered by: {colliding}")]
pub struct ConflictError {
    /// The refused action
    pub action: Action,
    /// The queued action it collided with
    pub colliding: Action,
}
