//! Error types for the configuration repository.
use std::path::PathBuf;
use thiserror::Error;

/// Represents errors that can occur while loading or persisting configuration.
#[derive(Debug, Error)]
pub enum ConfigRepositoryError {
    /// The file exists but could not be parsed. Callers recover by falling
    /// back to the default document.
    #[error("Config load error for {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
