//! Background service that recovers jobs whose attempt stopped reporting
//! heartbeats, most likely because the worker process hosting it crashed
//! or was killed without a chance to unwind.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use sf_models::heartbeat::{STALE_GRACE_PERIOD_SECS, STALE_THRESHOLD_SECS};
use sf_models::CoreError;
use sf_push::PushChannel;
use sf_queue::PriorityQueue;
use sf_store::JobStore;

use crate::heartbeat::HeartbeatRegistry;

pub struct StaleJobDetector {
    store: JobStore,
    queue: PriorityQueue,
    push: PushChannel,
    heartbeats: Arc<HeartbeatRegistry>,
    scan_interval: Duration,
}

impl StaleJobDetector {
    pub fn new(
        store: JobStore,
        queue: PriorityQueue,
        push: PushChannel,
        heartbeats: Arc<HeartbeatRegistry>,
        scan_interval: Duration,
    ) -> Self {
        Self {
            store,
            queue,
            push,
            heartbeats,
            scan_interval,
        }
    }

    /// Runs forever; spawn as a background task.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.scan_interval);
        loop {
            ticker.tick().await;
            self.scan_once().await;
        }
    }

    async fn scan_once(&self) {
        let stale = self
            .heartbeats
            .stale_job_ids(STALE_THRESHOLD_SECS, STALE_GRACE_PERIOD_SECS);
        if stale.is_empty() {
            return;
        }

        for job_id in stale {
            let job = match self.store.get(&job_id).await {
                Ok(job) => job,
                Err(e) => {
                    warn!(%job_id, "could not load job flagged stale: {e}");
                    self.heartbeats.remove(&job_id);
                    continue;
                }
            };

            if job.state.is_terminal() {
                self.heartbeats.remove(&job_id);
                continue;
            }

            warn!(%job_id, "recovering stale job with no recent heartbeat");

            let message = CoreError::TimedOut.to_string();
            let failed = match self.store.mark_failure(&job_id, message.clone(), None).await {
                Ok(job) => job,
                Err(e) => {
                    error!(%job_id, "failed to mark stale job failed: {e}");
                    continue;
                }
            };
            self.push.emit_failed(&job_id, message).await;
            self.heartbeats.remove(&job_id);

            if CoreError::TimedOut.is_retryable() && failed.can_retry() {
                let mut retried = failed.clone();
                retried.prepare_retry();
                if self.store.update(&retried).await.is_ok()
                    && self
                        .queue
                        .offer_after_cooldown(job_id.clone(), retried.priority_class)
                        .await
                        .is_ok()
                {
                    info!(%job_id, "requeued recovered job for retry");
                }
            }
        }
    }
}
