use std::path::Path;
use std::sync::Arc;

use rolelink_pipeline::audit::{AuditLogger, ChannelAuditSink, TracingAuditSink};
use rolelink_pipeline::consumer::{EventSource, JsonLinesSource};
use rolelink_pipeline::directory::{Directory, DirectoryFixture, MockDirectory};
use rolelink_pipeline::loader::{MutationApplier, RetryPolicy};
use rolelink_pipeline::orchestrator::{Orchestrator, OrchestratorConfig, Reconciler};
use rolelink_pipeline::permissions::PermissionRegistry;
use rolelink_pipeline::store::{GuildSettingsStore, RoleGraphStore};
use rolelink_repository::{ConfigRepository, JsonFileConfigRepository};
use tracing::info;

use crate::config::Settings;
use crate::errors::AppError;

/// `Dependencies` holds the wired components of a replay run.
///
/// The directory is in-memory: it is seeded from a fixture when one is
/// configured and accepts any role otherwise.
pub struct Dependencies {
    pub orchestrator: Orchestrator,
    pub repository: Arc<dyn ConfigRepository>,
    pub guild_settings: GuildSettingsStore,
    pub permissions: PermissionRegistry,
    pub directory: Arc<MockDirectory>,
}

impl Dependencies {
    /// Creates a new `Dependencies` instance.
    ///
    /// # Arguments
    ///
    /// * `settings` - Settings read from the environment
    ///
    /// # Returns
    ///
    /// The wired components, or an `AppError` if the configuration file or the
    /// directory fixture cannot be loaded.
    pub async fn new(settings: &Settings) -> Result<Self, AppError> {
        let config_file = JsonFileConfigRepository::open(&settings.config_path).await?;
        info!(path = %config_file.path().display(), "Configuration loaded");
        let repository: Arc<dyn ConfigRepository> = Arc::new(config_file);

        let directory = Arc::new(match &settings.directory_fixture {
            Some(path) => MockDirectory::from_fixture(load_fixture(path).await?),
            None => MockDirectory::new().permissive(),
        });
        let directory_handle: Arc<dyn Directory> = directory.clone();

        let audit = AuditLogger::new()
            .with_sink(Arc::new(TracingAuditSink))
            .with_sink(Arc::new(ChannelAuditSink::new(
                Arc::clone(&directory_handle),
                Arc::clone(&repository),
            )));

        let applier = MutationApplier::new(directory_handle, audit).with_retry_policy(RetryPolicy {
            delay: settings.retry_delay,
            ..RetryPolicy::default()
        });
        let reconciler = Reconciler::new(RoleGraphStore::new(Arc::clone(&repository)), applier);

        let source: Arc<dyn EventSource> = match &settings.events_path {
            Some(path) => Arc::new(JsonLinesSource::from_path(path)),
            None => Arc::new(JsonLinesSource::stdin()),
        };

        let orchestrator = Orchestrator::with_config(
            source,
            Arc::new(reconciler),
            OrchestratorConfig {
                channel_buffer_size: settings.channel_buffer_size,
                worker_idle: settings.worker_idle,
            },
        );

        Ok(Dependencies {
            orchestrator,
            guild_settings: GuildSettingsStore::new(Arc::clone(&repository)),
            permissions: PermissionRegistry::new(
                Arc::clone(&repository),
                settings.super_admin_roles.clone(),
            ),
            repository,
            directory,
        })
    }
}

async fn load_fixture(path: &Path) -> Result<DirectoryFixture, AppError> {
    let fixture_error = |message: String| AppError::Fixture {
        path: path.to_path_buf(),
        message,
    };
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| fixture_error(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| fixture_error(e.to_string()))
}
