//! In-process priority queue.

use std::collections::{BTreeMap, BinaryHeap};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tracing::{debug, info};

use sf_models::{JobId, PriorityClass};

use crate::entry::QueueEntry;
use crate::error::{QueueError, QueueResult};

/// Default cooldown before a failed-but-retryable job is re-offered.
pub const DEFAULT_RETRY_COOLDOWN_SECS: u64 = 60;

struct Inner {
    heap: BinaryHeap<QueueEntry>,
    cooldowns: BTreeMap<i64, Vec<QueueEntry>>,
    next_seq: u64,
    closed: bool,
}

/// Outcome of a `take` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Taken {
    Job(JobId),
    Cancelled,
}

/// Ordered, in-process delivery of ready-to-run jobs to workers.
///
/// Not durable: if the process dies, anything still PENDING in the Job
/// Store must be re-offered on startup by a recovery scan (see the
/// worker pool).
#[derive(Clone)]
pub struct PriorityQueue {
    inner: Arc<Mutex<Inner>>,
    notify: Arc<Notify>,
    retry_cooldown: Duration,
}

impl PriorityQueue {
    pub fn new(retry_cooldown: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                heap: BinaryHeap::new(),
                cooldowns: BTreeMap::new(),
                next_seq: 0,
                closed: false,
            })),
            notify: Arc::new(Notify::new()),
            retry_cooldown,
        }
    }

    pub fn from_env() -> Self {
        let secs = std::env::var("RETRY_COOLDOWN_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RETRY_COOLDOWN_SECS);
        Self::new(Duration::from_secs(secs))
    }

    /// Nonblocking enqueue, immediately eligible.
    pub async fn offer(&self, job_id: JobId, priority_class: PriorityClass) -> QueueResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return Err(QueueError::Closed);
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.heap.push(QueueEntry::new(job_id, priority_class, seq));
        drop(inner);
        self.notify.notify_one();
        Ok(())
    }

    /// Enqueue into the retry-pending holding area; it becomes eligible
    /// once this queue's configured cooldown elapses. A background timer
    /// (`run_retry_cooldown_timer`) must be running for this to ever
    /// surface.
    pub async fn offer_after_cooldown(&self, job_id: JobId, priority_class: PriorityClass) -> QueueResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return Err(QueueError::Closed);
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let expiry_ms = chrono::Utc::now().timestamp_millis() + self.retry_cooldown.as_millis() as i64;
        inner
            .cooldowns
            .entry(expiry_ms)
            .or_default()
            .push(QueueEntry::new(job_id, priority_class, seq));
        Ok(())
    }

    /// Blocks until a job is available, `cancel` resolves, or the queue
    /// is closed.
    pub async fn take(&self, cancel: impl Future<Output = ()>) -> QueueResult<Taken> {
        tokio::pin!(cancel);
        loop {
            {
                let mut inner = self.inner.lock().await;
                if let Some(entry) = inner.heap.pop() {
                    return Ok(Taken::Job(entry.job_id));
                }
                if inner.closed {
                    return Err(QueueError::Closed);
                }
            }

            tokio::select! {
                _ = self.notify.notified() => continue,
                _ = &mut cancel => return Ok(Taken::Cancelled),
            }
        }
    }

    /// Wake all blocked takers with `Closed`; subsequent offers are
    /// rejected.
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        inner.closed = true;
        drop(inner);
        self.notify.notify_waiters();
    }

    /// Move any cooldown entries whose expiry has elapsed into the live
    /// heap. Intended to be polled periodically by
    /// `run_retry_cooldown_timer`.
    pub async fn drain_expired_cooldowns(&self) -> usize {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let mut inner = self.inner.lock().await;
        let expired_keys: Vec<i64> = inner.cooldowns.range(..=now_ms).map(|(k, _)| *k).collect();
        let mut moved = 0;
        for key in expired_keys {
            if let Some(entries) = inner.cooldowns.remove(&key) {
                for entry in entries {
                    inner.heap.push(entry);
                    moved += 1;
                }
            }
        }
        drop(inner);
        if moved > 0 {
            self.notify.notify_waiters();
            debug!(count = moved, "moved retry-cooldown jobs into live queue");
        }
        moved
    }

    /// Long-running loop that periodically promotes expired
    /// retry-cooldown entries. Runs until the queue is closed.
    pub async fn run_retry_cooldown_timer(&self, poll_interval: Duration) {
        let mut ticker = tokio::time::interval(poll_interval);
        loop {
            ticker.tick().await;
            {
                let inner = self.inner.lock().await;
                if inner.closed {
                    break;
                }
            }
            self.drain_expired_cooldowns().await;
        }
        info!("retry cooldown timer stopped: queue closed");
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.heap.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
