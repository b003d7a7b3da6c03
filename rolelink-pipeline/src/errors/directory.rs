//! Error types returned by the directory collaborator.
use serde::Serialize;
use thiserror::Error;

/// Represents a failed call against the external directory.
///
/// Variants are split along the retry boundary: rate limiting and timeouts are
/// transient, everything else is permanent for the role in question.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Request timed out")]
    Timeout,

    #[error("Insufficient privilege: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Coarse classification recorded alongside each failed role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalErrorKind {
    Transient,
    Permission,
    NotFound,
}

impl DirectoryError {
    pub fn kind(&self) -> ExternalErrorKind {
        match self {
            DirectoryError::RateLimited { .. } | DirectoryError::Timeout => {
                ExternalErrorKind::Transient
            }
            DirectoryError::PermissionDenied(_) => ExternalErrorKind::Permission,
            DirectoryError::NotFound(_) => ExternalErrorKind::NotFound,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == ExternalErrorKind::Transient
    }
}
