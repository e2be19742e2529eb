//! Error types for market-core

use thiserror::Error;

/// Result type alias for market-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for tool operations
#[derive(Error, Debug)]
pub enum Error {
    /// Tool input could not be interpreted at all
    #[error("Invalid tool input: {0}")]
    InvalidInput(String),

    /// Tool execution failed
    #[error("Tool execution failed: {0}")]
    ProcessingFailed(String),

    /// No tool registered under the requested name
    #[error("Tool not found: {0}")]
    ToolNotFound(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidInput(err.to_string())
    }
}
