//! Error types for audit delivery. These never leave the audit module: the
//! logger reports them and moves on.
use thiserror::Error;

use crate::errors::DirectoryError;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
