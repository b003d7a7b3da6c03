use std::sync::Mutex;

use async_trait::async_trait;
use rolelink_shared::types::{AuditEvent, MemberKey};

use crate::audit::AuditSink;
use crate::errors::AuditError;

/// Keeps every published audit event in memory, in publication order.
#[derive(Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.lock().clone()
    }

    /// Events recorded for one member, in publication order.
    pub fn events_for(&self, key: MemberKey) -> Vec<AuditEvent> {
        self.lock()
            .iter()
            .filter(|event| event.guild_id == key.guild_id && event.member_id == key.member_id)
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AuditEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn publish(&self, event: &AuditEvent) -> Result<(), AuditError> {
        self.lock().push(event.clone());
        Ok(())
    }
}
