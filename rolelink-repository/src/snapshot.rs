use std::sync::{Arc, RwLock};

use rolelink_shared::types::ConfigDocument;
use tokio::sync::{Mutex, MutexGuard};

/// Copy-on-write holder for the current configuration document.
///
/// Reads take a short read lock to clone the `Arc`; writers hold the async
/// `writer` lock across persistence so only one edit is in flight.
pub(crate) struct SnapshotCell {
    current: RwLock<Arc<ConfigDocument>>,
    writer: Mutex<()>,
}

impl SnapshotCell {
    pub(crate) fn new(document: ConfigDocument) -> Self {
        Self {
            current: RwLock::new(Arc::new(document)),
            writer: Mutex::new(()),
        }
    }

    pub(crate) fn get(&self) -> Arc<ConfigDocument> {
        let guard = self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    pub(crate) fn publish(&self, document: ConfigDocument) -> Arc<ConfigDocument> {
        let document = Arc::new(document);
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::clone(&document);
        document
    }

    pub(crate) async fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }
}
