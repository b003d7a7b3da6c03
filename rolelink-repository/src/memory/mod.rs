//! In-memory configuration repository, used by tests and dry runs.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rolelink_shared::types::ConfigDocument;

use crate::snapshot::SnapshotCell;
use crate::{ConfigMutation, ConfigRepository, ConfigRepositoryError};

/// Configuration repository that keeps the document in memory only.
///
/// `load` and `save` are no-ops apart from counting saves, which tests use to
/// assert that unchanged mutations are not persisted.
pub struct InMemoryConfigRepository {
    cell: SnapshotCell,
    saves: AtomicUsize,
}

impl InMemoryConfigRepository {
    pub fn new() -> Self {
        Self::with_document(ConfigDocument::default())
    }

    pub fn with_document(document: ConfigDocument) -> Self {
        Self {
            cell: SnapshotCell::new(document),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of times a document was persisted.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryConfigRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigRepository for InMemoryConfigRepository {
    fn snapshot(&self) -> Arc<ConfigDocument> {
        self.cell.get()
    }

    async fn load(&self) -> Result<Arc<ConfigDocument>, ConfigRepositoryError> {
        Ok(self.cell.get())
    }

    async fn save(&self) -> Result<(), ConfigRepositoryError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn mutate(
        &self,
        mutation: ConfigMutation<'_>,
    ) -> Result<Arc<ConfigDocument>, ConfigRepositoryError> {
        let _writer = self.cell.lock_writer().await;
        let mut document = ConfigDocument::clone(&self.cell.get());
        if !mutation(&mut document) {
            return Ok(self.cell.get());
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(self.cell.publish(document))
    }
}
