//! Error types for the service layer

use statestore::StateError;
use thiserror::Error;

/// Errors from service operations
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("State error: {0}")]
    State(#[from] StateError),
}

/// Result of service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
