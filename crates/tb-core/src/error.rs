//! # AppError
//!
//! Centralized error handling for Threadboard.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all tb-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Thread, Reply)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Infrastructure failure (e.g., DB down)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn thread_not_found(id: impl ToString) -> Self {
        AppError::NotFound("Thread".to_string(), id.to_string())
    }

    pub fn reply_not_found(id: impl ToString) -> Self {
        AppError::NotFound("Reply".to_string(), id.to_string())
    }
}

// Store adapters report through anyhow; anything they raise is infrastructure.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(format!("{:#}", err))
    }
}

/// A specialized Result type for Threadboard logic.
pub type Result<T> = std::result::Result<T, AppError>;
