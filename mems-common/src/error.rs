//! Common error types for MEMS

use thiserror::Error;

/// Common result type for MEMS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across MEMS crates
///
/// Scoring, aggregation and classification are total over their input
/// domain and never produce these; they come from configuration and the
/// source loaders.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source data could not be parsed into records
    #[error("Parse error: {0}")]
    Parse(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
