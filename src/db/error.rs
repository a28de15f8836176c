//! Error taxonomy for directory and workflow operations.
//!
//! Operations return these kinds directly; the API layer owns the mapping to
//! HTTP status codes (including the mutation-path rule where a missing
//! referenced entity surfaces as a 400 rather than a 404).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed or semantically invalid input
    #[error("{0}")]
    Validation(String),

    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Caller is authenticated but not allowed to act on this entity
    #[error("{0}")]
    Forbidden(String),

    /// Underlying store failure, propagated unchanged
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }
}
