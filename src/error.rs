//! Error types for the provisioning service.

use thiserror::Error;

use crate::mailcow::MailcowError;

/// Common error type for the provisioning service.
#[derive(Error, Debug)]
pub enum AppError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for settings or request input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Resource already exists.
    #[error("{0} already exists")]
    Conflict(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Remote Mailcow call failed.
    #[error("mailcow error: {0}")]
    Mailcow(#[from] MailcowError),

    /// Local email account creation or linking failed after the
    /// remote mailbox was created.
    #[error("reconciliation error: {0}")]
    Reconciliation(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, AppError>;
