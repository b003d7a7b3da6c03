//! Audit module: fans audit events out to one or more sinks.
//!
//! Delivery is best effort. A failing sink is logged and skipped; it never
//! fails the role change that produced the event.

mod channel;
mod memory;
mod render;
mod tracing_sink;

pub use channel::ChannelAuditSink;
pub use memory::MemoryAuditSink;
pub use render::render_message;
pub use tracing_sink::TracingAuditSink;

use std::sync::Arc;

use async_trait::async_trait;
use rolelink_shared::types::AuditEvent;
use tracing::warn;

use crate::errors::AuditError;

/// A destination for audit events.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Short name used in logs when delivery fails.
    fn name(&self) -> &'static str;

    async fn publish(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

/// Delivers each audit event to every registered sink, in registration order.
#[derive(Default, Clone)]
pub struct AuditLogger {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl AuditLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Publishes `event` to every sink. Sink failures are swallowed.
    pub async fn record(&self, event: &AuditEvent) {
        for sink in &self.sinks {
            if let Err(e) = sink.publish(event).await {
                warn!(
                    sink = sink.name(),
                    guild_id = %event.guild_id,
                    member_id = %event.member_id,
                    action = %event.action,
                    error = %e,
                    "Failed to deliver audit event"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DirectoryError;
    use rolelink_shared::types::{AuditAction, GuildId, MemberId, RoleId};

    struct FailingSink;

    #[async_trait]
    impl AuditSink for FailingSink {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn publish(&self, _event: &AuditEvent) -> Result<(), AuditError> {
            Err(DirectoryError::Timeout.into())
        }
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_block_others() {
        let memory = Arc::new(MemoryAuditSink::new());
        let logger = AuditLogger::new()
            .with_sink(Arc::new(FailingSink))
            .with_sink(memory.clone());

        let event = AuditEvent::automatic(
            GuildId(1),
            MemberId(2),
            AuditAction::AutoGrant,
            RoleId(3),
            vec![RoleId(4)],
        );
        logger.record(&event).await;

        assert_eq!(memory.events(), vec![event]);
    }
}
