//! Consumer module for the rolelink pipeline.
//!
//! Provides the `EventSource` trait for receiving role change notifications,
//! the [`intake`] diff that turns two snapshots into added and removed roles,
//! and a newline-delimited JSON source used for replay runs.

mod intake;
mod json_lines;

pub use intake::diff_roles;
pub use json_lines::JsonLinesSource;

use async_trait::async_trait;
use rolelink_shared::types::RoleChangeEvent;
use tokio::sync::mpsc;

use crate::errors::ConsumerError;

/// Messages flowing from an event source to the orchestrator.
#[derive(Debug, Clone)]
pub enum StreamMessage {
    RoleChange(RoleChangeEvent),
    /// A recoverable problem with a single input, e.g. an undecodable line.
    Error(ConsumerError),
    End,
}

/// Trait for sources of role change notifications.
///
/// Implementations push messages into `sender` until the source is exhausted,
/// finishing with [`StreamMessage::End`].
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn run(&self, sender: mpsc::Sender<StreamMessage>) -> Result<(), ConsumerError>;
}
