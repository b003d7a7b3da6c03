//! This module defines the `ConfigRepository` trait, the injected store for the
//! role graph, log channels and command permissions.
use std::sync::Arc;

use rolelink_shared::types::ConfigDocument;

use crate::errors::ConfigRepositoryError;

/// A transactional edit of the configuration document.
///
/// The closure receives a private copy of the current document and returns
/// whether it changed anything. Unchanged edits are neither persisted nor
/// published.
pub type ConfigMutation<'a> = &'a mut (dyn FnMut(&mut ConfigDocument) -> bool + Send);

/// A trait that defines the interface for the configuration store.
///
/// Readers always observe a complete document: `snapshot` hands out an `Arc`
/// of the last committed version, and `mutate` swaps in a new version only
/// after it has been persisted. Writers are serialized by the implementation.
#[async_trait::async_trait]
pub trait ConfigRepository: Send + Sync {
    /// Returns the last committed configuration document.
    fn snapshot(&self) -> Arc<ConfigDocument>;

    /// Re-reads the configuration from the backing store and publishes it.
    ///
    /// # Returns
    ///
    /// The freshly loaded document, or a `ConfigRepositoryError` if the
    /// backing store could not be read or written.
    async fn load(&self) -> Result<Arc<ConfigDocument>, ConfigRepositoryError>;

    /// Persists the current snapshot to the backing store.
    async fn save(&self) -> Result<(), ConfigRepositoryError>;

    /// Applies `mutation` to a copy of the document, persists it and publishes
    /// it as the new snapshot.
    ///
    /// # Arguments
    ///
    /// * `mutation` - Closure editing the document; returns `true` if it
    ///   changed anything.
    ///
    /// # Returns
    ///
    /// The document visible after the call.
    async fn mutate(
        &self,
        mutation: ConfigMutation<'_>,
    ) -> Result<Arc<ConfigDocument>, ConfigRepositoryError>;
}
