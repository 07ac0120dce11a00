//! CLI error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Service configuration error
    #[error("Configuration error: {0}")]
    Config(String),
    /// Settings store error
    #[error("Settings store error: {0}")]
    Store(String),
    /// Overlay rendering error
    #[error("Render error: {0}")]
    Render(String),
    /// Input that is not a settings record
    #[error("Invalid input: {0}")]
    Input(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
