//! CLI error types

use idempiere_ws_client::{TransportFailure, WsError};
use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Request could not be built or the invocation failed
    #[error("{}: {}", .0.kind(), .0)]
    Invocation(#[from] WsError),

    /// HTTP client could not be set up
    #[error("HTTP client error: {0}")]
    Transport(#[from] TransportFailure),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
