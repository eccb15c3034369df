//! Error types for the engagement domain.

use thiserror::Error;

/// Result type for engagement operations.
pub type EngagementResult<T> = Result<T, EngagementError>;

/// Errors that can occur in the engagement domain.
#[derive(Debug, Error)]
pub enum EngagementError {
    /// Input is malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Error surfaced from the notifications domain.
    ///
    /// Inside trigger jobs and the absence engine these are logged and
    /// counted, not propagated.
    #[error("Notification error: {0}")]
    Notification(#[from] domain_notifications::NotificationError),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for EngagementError {
    fn from(err: sea_orm::DbErr) -> Self {
        EngagementError::Database(err.to_string())
    }
}
