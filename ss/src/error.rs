//! Error types for state operations

use thiserror::Error;

/// Errors from state operations
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("State file locked: {0}")]
    Locked(String),
}

/// Result of state operations
pub type StateResult<T> = Result<T, StateError>;
