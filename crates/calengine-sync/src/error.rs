//! Sync error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use calengine_providers::ProviderError;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that fail a whole stream.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The source could not be fetched, after retries where applicable.
    #[error("fetch failed: {0}")]
    Provider(#[from] ProviderError),

    /// Reading or writing an output file failed.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A prior output file exists but could not be read back.
    #[error("cannot read history from {}: {message}", path.display())]
    History { path: PathBuf, message: String },
}

impl SyncError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn history(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::History {
            path: path.into(),
            message: message.into(),
        }
    }
}
