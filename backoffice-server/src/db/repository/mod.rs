//! Repository Module
//!
//! Free functions over `&SqlitePool` per table. Handlers and services
//! convert [`RepoError`] into `AppError` at the boundary.

pub mod business_day;
pub mod operator;
pub mod outbox;
pub mod pack;
pub mod shift;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// State-machine precondition violated. Never retried
    /// automatically; the caller must re-read state.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
