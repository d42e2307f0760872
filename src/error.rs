//! Service error types
//!
//! Errors surfaced by the request handlers. Store and auth failures pass
//! through unchanged; only validation is raised by the core routines.

use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;

/// Malformed or out-of-contract input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Handler-level error
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => {
                ServiceError::NotFound(format!("{} document '{}'", collection, id))
            }
            other => ServiceError::Store(other),
        }
    }
}

/// Result type for handlers
pub type ServiceResult<T> = Result<T, ServiceError>;
