//! CLI error types.

use thiserror::Error;

use calengine_core::TracingError;
use calengine_sync::SyncError;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that stop the binary before or during a run.
#[derive(Debug, Error)]
pub enum CliError {
    /// Unreadable or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A stream could not be set up.
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tracing(#[from] TracingError),
}

impl CliError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
