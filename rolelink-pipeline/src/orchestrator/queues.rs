use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rolelink_shared::types::{MemberKey, RoleChangeEvent};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::SendError};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::orchestrator::reconciler::Reconciler;

/// Finished workers are pruned from the table once every this many dispatches.
const PRUNE_INTERVAL: usize = 256;

struct Worker {
    sender: UnboundedSender<RoleChangeEvent>,
    handle: JoinHandle<()>,
}

/// One single-consumer queue per member.
///
/// Events for the same member are reconciled strictly in dispatch order;
/// different members are reconciled concurrently. A worker that stays idle
/// for `idle` closes its queue, drains what was already enqueued and exits.
/// When the dispatcher finds a closed queue it starts a replacement worker
/// that first waits for its predecessor, so ordering holds across restarts.
pub(crate) struct MemberQueues {
    reconciler: Arc<Reconciler>,
    idle: Duration,
    workers: HashMap<MemberKey, Worker>,
    dispatched: usize,
}

impl MemberQueues {
    pub(crate) fn new(reconciler: Arc<Reconciler>, idle: Duration) -> Self {
        Self {
            reconciler,
            idle,
            workers: HashMap::new(),
            dispatched: 0,
        }
    }

    pub(crate) fn dispatch(&mut self, event: RoleChangeEvent) {
        let key = event.member_key();

        let pending = match self.workers.get(&key) {
            Some(worker) => match worker.sender.send(event) {
                Ok(()) => None,
                Err(SendError(event)) => Some(event),
            },
            None => Some(event),
        };
        let Some(event) = pending else {
            self.after_dispatch();
            return;
        };

        let previous = self.workers.remove(&key).map(|worker| worker.handle);
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(
            key,
            Arc::clone(&self.reconciler),
            receiver,
            self.idle,
            previous,
            event,
        ));
        self.workers.insert(key, Worker { sender, handle });
        debug!(guild_id = %key.guild_id, member_id = %key.member_id, "Member worker started");
        self.after_dispatch();
    }

    /// Number of workers that have not exited yet.
    pub(crate) fn active(&self) -> usize {
        self.workers
            .values()
            .filter(|worker| !worker.handle.is_finished())
            .count()
    }

    /// Closes every queue and waits until all admitted events are reconciled.
    pub(crate) async fn shutdown(self) {
        let handles: Vec<(MemberKey, JoinHandle<()>)> = self
            .workers
            .into_iter()
            .map(|(key, worker)| (key, worker.handle))
            .collect();

        for (key, handle) in handles {
            if let Err(e) = handle.await {
                error!(
                    guild_id = %key.guild_id,
                    member_id = %key.member_id,
                    error = %e,
                    "Member worker failed"
                );
            }
        }
    }

    fn after_dispatch(&mut self) {
        self.dispatched = self.dispatched.wrapping_add(1);
        if self.dispatched % PRUNE_INTERVAL == 0 {
            self.workers.retain(|_, worker| !worker.handle.is_finished());
        }
    }
}

async fn run_worker(
    key: MemberKey,
    reconciler: Arc<Reconciler>,
    mut receiver: UnboundedReceiver<RoleChangeEvent>,
    idle: Duration,
    previous: Option<JoinHandle<()>>,
    first: RoleChangeEvent,
) {
    if let Some(previous) = previous {
        // Only completion matters here, not how the predecessor ended.
        let _ = previous.await;
    }

    reconciler.reconcile(&first).await;

    loop {
        match tokio::time::timeout(idle, receiver.recv()).await {
            Ok(Some(event)) => {
                reconciler.reconcile(&event).await;
            }
            Ok(None) => break,
            Err(_) => {
                receiver.close();
                while let Ok(event) = receiver.try_recv() {
                    reconciler.reconcile(&event).await;
                }
                debug!(
                    guild_id = %key.guild_id,
                    member_id = %key.member_id,
                    "Member worker idle, exiting"
                );
                break;
            }
        }
    }
}
