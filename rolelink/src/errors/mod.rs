//! Error types for the rolelink application.
//!
//! Consolidates the errors of the pipeline and repository crates with the
//! start-up failures of the binary itself.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] rolelink_pipeline::errors::OrchestratorError),
    #[error("Repository error: {0}")]
    Repository(#[from] rolelink_repository::ConfigRepositoryError),
    #[error("Failed to load directory fixture {path}: {message}")]
    Fixture { path: PathBuf, message: String },
    #[error("Failed to initialize tracing: {0}")]
    Tracing(String),
}
