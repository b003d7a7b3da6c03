//! Error types for the consumer module.
use thiserror::Error;

/// Represents errors that can occur while reading role change events.
#[derive(Debug, Error, Clone)]
pub enum ConsumerError {
    #[error("Error opening event source: {0}")]
    OpeningSource(String),
    #[error("Error reading event source: {0}")]
    ReadingSource(String),
    #[error("Error decoding event on line {line}: {message}")]
    DecodingEvent { line: usize, message: String },
    #[error("Error sending message through channel: {0}")]
    ChannelSend(String),
}
