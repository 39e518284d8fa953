//! Shared error and result types.

use thiserror::Error;

/// Errors surfaced by the intake service
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Configuration is missing or inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// A durable-store operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// An outbound HTTP call failed
    #[error("HTTP error: {0}")]
    Http(String),

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O error (socket bind, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias
pub type Result<T> = std::result::Result<T, IntakeError>;
