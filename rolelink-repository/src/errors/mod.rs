//! Error types for the rolelink repository.
mod config_repository;

pub use config_repository::ConfigRepositoryError;
