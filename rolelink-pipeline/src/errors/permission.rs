//! Error types for the permission registry.
use rolelink_repository::ConfigRepositoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("Invalid command name: {0:?}")]
    InvalidCommand(String),

    #[error("Repository error: {0}")]
    Repository(#[from] ConfigRepositoryError),
}
