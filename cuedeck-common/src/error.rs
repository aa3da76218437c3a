//! Common error types for CueDeck

use thiserror::Error;

/// Common result type for CueDeck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the store and the HTTP layer
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Version, scene, tag or track does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Destination already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid user input or missing request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Path component would escape the music root
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Missing or rejected session
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
