//! Error types for the role graph and guild settings stores.
use rolelink_repository::ConfigRepositoryError;
use rolelink_shared::types::RoleId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("A parent role needs between 1 and {max} child roles, got {count}")]
    InvalidChildCount { count: usize, max: usize },

    #[error("Role {0} has no connected roles")]
    NotConnected(RoleId),

    #[error("Repository error: {0}")]
    Repository(#[from] ConfigRepositoryError),
}
