//! JSON file implementation of the configuration repository.
//!
//! The document is stored as pretty-printed JSON. Writes go to a sibling
//! temporary file that is renamed over the original, so a crash mid-write
//! never leaves a truncated configuration behind.
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use rolelink_shared::types::ConfigDocument;
use tracing::{info, warn};

use crate::snapshot::SnapshotCell;
use crate::{ConfigMutation, ConfigRepository, ConfigRepositoryError};

/// File-backed configuration repository.
pub struct JsonFileConfigRepository {
    path: PathBuf,
    cell: SnapshotCell,
}

impl JsonFileConfigRepository {
    /// Opens the configuration file at `path`.
    ///
    /// A missing file is created with the default document. A file that cannot
    /// be parsed is logged and replaced with the default document. In both
    /// cases, and after every successful load, the normalized document is
    /// written back so that missing top-level keys appear on disk.
    ///
    /// # Errors
    ///
    /// Returns `ConfigRepositoryError::Io` if the file cannot be read or
    /// written.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigRepositoryError> {
        let path = path.into();
        let document = read_or_default(&path).await?;
        write_document(&path, &document).await?;

        Ok(Self {
            path,
            cell: SnapshotCell::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigRepository for JsonFileConfigRepository {
    fn snapshot(&self) -> Arc<ConfigDocument> {
        self.cell.get()
    }

    async fn load(&self) -> Result<Arc<ConfigDocument>, ConfigRepositoryError> {
        let _writer = self.cell.lock_writer().await;
        let document = read_or_default(&self.path).await?;
        write_document(&self.path, &document).await?;
        Ok(self.cell.publish(document))
    }

    async fn save(&self) -> Result<(), ConfigRepositoryError> {
        let _writer = self.cell.lock_writer().await;
        write_document(&self.path, &self.cell.get()).await
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

        write_document(&self.path, &document).await?;
        info!(path = %self.path.display(), "Configuration saved");
        Ok(self.cell.publish(document))
    }
}

/// Reads the document, falling back to defaults when the file is absent or
/// corrupt.
async fn read_or_default(path: &Path) -> Result<ConfigDocument, ConfigRepositoryError> {
    match read_document(path).await {
        Ok(document) => Ok(document),
        Err(ConfigRepositoryError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "Configuration file not found, initializing defaults");
            Ok(ConfigDocument::default())
        }
        Err(e @ ConfigRepositoryError::Load { .. }) => {
            warn!(error = %e, "Configuration file is corrupt, falling back to defaults");
            Ok(ConfigDocument::default())
        }
        Err(e) => Err(e),
    }
}

async fn read_document(path: &Path) -> Result<ConfigDocument, ConfigRepositoryError> {
    let bytes = tokio::fs::read(path).await?;
    serde_json::from_slice(&bytes).map_err(|source| ConfigRepositoryError::Load {
        path: path.to_path_buf(),
        source,
    })
}

async fn write_document(
    path: &Path,
    document: &ConfigDocument,
) -> Result<(), ConfigRepositoryError> {
    let bytes = serde_json::to_vec_pretty(document)?;
    let tmp_path = temporary_path(path);
    tokio::fs::write(&tmp_path, &bytes).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "config.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
