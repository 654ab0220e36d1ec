//! Per-job cancellation signaling.
//!
//! The Submission API's Cancel operation and the pipeline driver's stage
//! checkpoints run in different tasks, potentially on different workers'
//! task sets. A [`CancellationRegistry`] is the shared handle that lets the
//! former reach the latter: the worker pool registers a token before
//! dispatching an attempt, the driver polls it between stages, and the API
//! signals it by job id without knowing which worker picked the job up.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

use sf_models::JobId;

/// A single attempt's cancellation flag, cheap to clone and share between
/// the registry and the driver invocation it was issued for.
#[derive(Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancellationToken {
    fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Resolves once cancelled, immediately if already cancelled. Suitable
    /// as the `cancel` future passed to `PriorityQueue::take`.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.notify.notified().await;
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
        self.notify.notify_waiters();
    }
}

/// Tracks one token per in-flight attempt.
#[derive(Clone, Default)]
pub struct CancellationRegistry {
    tokens: Arc<Mutex<HashMap<JobId, CancellationToken>>>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fresh token for `job_id`, replacing any stale one left
    /// over from a prior attempt of the same job.
    pub async fn register(&self, job_id: JobId) -> CancellationToken {
        let token = CancellationToken::new();
        self.tokens.lock().await.insert(job_id, token.clone());
        token
    }

    /// Signals cancellation for `job_id`. Returns whether a token was found
    /// (i.e. an attempt for that job was actually registered as running).
    pub async fn cancel(&self, job_id: &JobId) -> bool {
        match self.tokens.lock().await.get(job_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub async fn remove(&self, job_id: &JobId) {
        self.tokens.lock().await.remove(job_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_wakes_a_waiting_token() {
        let registry = CancellationRegistry::new();
        let job_id = JobId::from_string("j1");
        let token = registry.register(job_id.clone()).await;
        assert!(!token.is_cancelled());

        let waiter = token.clone();
        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
        });

        assert!(registry.cancel(&job_id).await);
        handle.await.unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_future_resolves_immediately_if_already_cancelled() {
        let registry = CancellationRegistry::new();
        let job_id = JobId::from_string("j1");
        let token = registry.register(job_id.clone()).await;
        registry.cancel(&job_id).await;
        token.cancelled().await;
    }

    #[tokio::test]
    async fn cancel_of_unregistered_job_is_a_no_op() {
        let registry = CancellationRegistry::new();
        assert!(!registry.cancel(&JobId::from_string("ghost")).await);
    }

    #[tokio::test]
    async fn remove_drops_the_token() {
        let registry = CancellationRegistry::new();
        let job_id = JobId::from_string("j1");
        registry.register(job_id.clone()).await;
        registry.remove(&job_id).await;
        assert!(!registry.cancel(&job_id).await);
    }
}
