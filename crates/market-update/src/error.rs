//! Error types for market-update operations

use market_utils::EnvError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the search and delivery components
#[derive(Debug, Error)]
pub enum MarketError {
    /// Missing or invalid configuration (for example no messaging token)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Report file absent at delivery time
    #[error("Report file not found: {}", .0.display())]
    MissingArtifact(PathBuf),

    /// Search provider failed or returned something unusable
    #[error("Search error: {0}")]
    SearchError(String),

    /// A provider answered but refused the request
    #[error("{provider} rejected the request: {error}")]
    ProviderRejected {
        provider: String,
        error: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Filesystem error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Environment variable could not be parsed
    #[error(transparent)]
    EnvError(#[from] EnvError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for market-update operations
pub type Result<T> = std::result::Result<T, MarketError>;

/// Convert MarketError to market_core::Error
impl From<MarketError> for market_core::Error {
    fn from(err: MarketError) -> Self {
        market_core::Error::ProcessingFailed(err.to_string())
    }
}
