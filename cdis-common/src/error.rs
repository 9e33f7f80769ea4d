//! Common error types for CDIS

use thiserror::Error;

/// Common result type for CDIS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across CDIS services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error (e.g. missing API key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// External collaborator unreachable or out of retries
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Collaborator responded but the payload is unusable
    #[error("Upstream data error: {0}")]
    UpstreamData(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
