//! Rolelink Main Entry Point
//!
//! Replays newline-delimited role change events through the propagation
//! pipeline and applies the resulting grants and revokes.

use dotenv::dotenv;
use rolelink::{AppError, Dependencies, Settings};
use std::env;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rolelink=info,rolelink_pipeline=info"));

    let json = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
            .map_err(|e| AppError::Tracing(e.to_string()))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
            .map_err(|e| AppError::Tracing(e.to_string()))?;
    }

    info!(
        service_name = "rolelink",
        service_version = env!("CARGO_PKG_VERSION"),
        json,
        "Tracing initialized"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    init_tracing()?;

    let settings = Settings::from_env()?;
    info!(?settings, "Starting rolelink");

    let dependencies = match Dependencies::new(&settings).await {
        Ok(dependencies) => dependencies,
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let config = dependencies.repository.snapshot();
    for guild_id in config.role_connections.keys() {
        let overview = dependencies.guild_settings.overview(*guild_id);
        let commands: Vec<String> = dependencies.permissions.list(*guild_id).into_keys().collect();
        info!(
            guild_id = %guild_id,
            log_channel = ?overview.log_channel,
            connections = overview.connections,
            permissions = ?commands,
            "Guild configuration"
        );
    }

    match dependencies.orchestrator.run().await {
        Ok(stats) => {
            info!(
                events = stats.events,
                granted = stats.granted,
                revoked = stats.revoked,
                failed = stats.failed,
                "Replay completed"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Replay failed");
            Err(e.into())
        }
    }
}
