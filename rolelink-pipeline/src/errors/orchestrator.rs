//! Error types for the orchestrator module.
use thiserror::Error;

use crate::errors::consumer::ConsumerError;

/// Represents errors that can occur within the orchestrator.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Consumer error: {0}")]
    Consumer(#[from] ConsumerError),
}
