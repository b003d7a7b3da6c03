//! Error types for moderator role commands.
use thiserror::Error;

use crate::errors::DirectoryError;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Member is not allowed to run /{0}")]
    Forbidden(String),

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),
}
