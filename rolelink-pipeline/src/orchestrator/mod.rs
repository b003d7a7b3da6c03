//! Orchestrator module for the rolelink pipeline.
//!
//! Reads role change events from an [`EventSource`] and hands each one to the
//! queue of the member it concerns. Members are reconciled in parallel, events
//! of one member strictly one after another.
mod queues;
mod reconciler;

pub use reconciler::{ReconcileStats, Reconciler};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

use crate::consumer::{EventSource, StreamMessage};
use crate::errors::{ConsumerError, OrchestratorError};
use queues::MemberQueues;

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Capacity of the channel between the event source and the dispatcher.
    pub channel_buffer_size: usize,
    /// How long a member worker waits for new events before exiting.
    pub worker_idle: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: 1000,
            worker_idle: Duration::from_secs(60),
        }
    }
}

/// `Orchestrator` connects an event source to the per-member reconcilers.
pub struct Orchestrator {
    source: Arc<dyn EventSource>,
    reconciler: Arc<Reconciler>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn EventSource>, reconciler: Arc<Reconciler>) -> Self {
        Self::with_config(source, reconciler, OrchestratorConfig::default())
    }

    pub fn with_config(
        source: Arc<dyn EventSource>,
        reconciler: Arc<Reconciler>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            source,
            reconciler,
            config,
        }
    }

    /// Runs until the source ends or a shutdown signal arrives.
    ///
    /// Intake stops at that point, but every event already dispatched to a
    /// member queue is still reconciled before this method returns.
    ///
    /// # Returns
    ///
    /// The final totals, or an `OrchestratorError` if the event source failed
    /// before a shutdown was requested.
    #[instrument(skip(self))]
    pub async fn run(self) -> Result<ReconcileStats, OrchestratorError> {
        info!("Starting rolelink orchestrator");

        let (sender, mut receiver) =
            mpsc::channel::<StreamMessage>(self.config.channel_buffer_size);
        let source = Arc::clone(&self.source);
        let source_handle = tokio::spawn(async move { source.run(sender).await });

        let mut queues = MemberQueues::new(Arc::clone(&self.reconciler), self.config.worker_idle);
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);
        let mut interrupted = false;

        loop {
            tokio::select! {
                message = receiver.recv() => {
                    match message {
                        Some(StreamMessage::RoleChange(event)) => queues.dispatch(event),
                        Some(StreamMessage::Error(e)) => {
                            warn!(error = %e, "Received error from event source");
                        }
                        Some(StreamMessage::End) | None => {
                            info!("Event source ended");
                            break;
                        }
                    }
                }
                _ = &mut shutdown => {
                    info!("Received shutdown signal, draining member queues");
                    interrupted = true;
                    break;
                }
            }
        }

        // Stops the source if it is still producing.
        drop(receiver);
        info!(active_workers = queues.active(), "Waiting for member workers");
        queues.shutdown().await;

        if interrupted {
            source_handle.abort();
        }
        let source_result = match source_handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(ConsumerError::ReadingSource(e.to_string())),
        };

        let stats = self.reconciler.stats();
        info!(
            events = stats.events,
            granted = stats.granted,
            revoked = stats.revoked,
            failed = stats.failed,
            "Orchestrator stopped"
        );

        match source_result {
            Err(ConsumerError::ChannelSend(_)) if interrupted => Ok(stats),
            Err(e) => {
                error!(error = %e, "Event source failed");
                Err(e.into())
            }
            Ok(()) => Ok(stats),
        }
    }
}
