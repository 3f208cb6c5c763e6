//! Error types for the setl CLI
//!
//! Messages are user-facing: they say what went wrong and, where there is
//! one, what to change.

use setl_common::SetlError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// The pipeline itself failed; the message names the stage and source
    #[error("{0}")]
    Pipeline(#[from] SetlError),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check the config file and SETL_* environment variables.")]
    Config(String),

    /// TOML configuration file could not be parsed
    #[error("Failed to parse config file '{path}': {reason}")]
    ConfigParse { path: String, reason: String },

    /// Effective configuration could not be rendered
    #[error("Failed to render configuration: {0}")]
    ConfigRender(#[from] toml::ser::Error),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// JSON rendering failed
    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
