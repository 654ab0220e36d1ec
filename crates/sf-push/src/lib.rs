//! In-process push channel: one room per job, fanning `PushEvent`s out to
//! whoever is currently subscribed. Not durable — events emitted while
//! no one is subscribed are simply dropped; observers that need
//! reliability poll the job store instead.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use sf_models::{JobId, PushEvent, ResultBundle};

/// Bound on each subscriber's mailbox. Non-terminal events are dropped
/// once this fills; terminal events always get through via a blocking
/// send.
const SUBSCRIBER_BUFFER_SIZE: usize = 32;

type SubscriberId = u64;

struct Subscriber {
    id: SubscriberId,
    tx: mpsc::Sender<PushEvent>,
}

#[derive(Default)]
struct Rooms {
    rooms: HashMap<JobId, Vec<Subscriber>>,
}

/// Fan-out channel for job lifecycle events.
#[derive(Clone)]
pub struct PushChannel {
    rooms: Arc<Mutex<Rooms>>,
    next_id: Arc<AtomicU64>,
}

impl Default for PushChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl PushChannel {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(Mutex::new(Rooms::default())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Join a job's room. Returns a receiver for that job's events and a
    /// handle to pass to `unsubscribe`.
    pub async fn subscribe(&self, job_id: &JobId) -> (mpsc::Receiver<PushEvent>, SubscriberId) {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER_SIZE);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut rooms = self.rooms.lock().await;
        rooms.rooms.entry(job_id.clone()).or_default().push(Subscriber { id, tx });
        (rx, id)
    }

    pub async fn unsubscribe(&self, job_id: &JobId, subscriber_id: SubscriberId) {
        let mut rooms = self.rooms.lock().await;
        if let Some(subs) = rooms.rooms.get_mut(job_id) {
            subs.retain(|s| s.id != subscriber_id);
            if subs.is_empty() {
                rooms.rooms.remove(job_id);
            }
        }
    }

    pub async fn emit_started(&self, job_id: &JobId) {
        self.emit(PushEvent::started(job_id.clone())).await;
    }

    pub async fn emit_progress(&self, job_id: &JobId, pct: f64, msg: impl Into<String>, step: impl Into<String>) {
        self.emit(PushEvent::progress(job_id.clone(), pct, msg, step)).await;
    }

    pub async fn emit_completed(&self, job_id: &JobId, artifact: ResultBundle) {
        self.emit(PushEvent::completed(job_id.clone(), artifact)).await;
    }

    pub async fn emit_failed(&self, job_id: &JobId, err: impl Into<String>) {
        self.emit(PushEvent::failed(job_id.clone(), err)).await;
    }

    pub async fn emit_cancelled(&self, job_id: &JobId) {
        self.emit(PushEvent::cancelled(job_id.clone())).await;
    }

    async fn emit(&self, event: PushEvent) {
        let job_id = event.job_id().clone();
        let mut rooms = self.rooms.lock().await;
        let Some(subs) = rooms.rooms.get_mut(&job_id) else {
            return;
        };

        let terminal = event.is_terminal();
        let mut still_connected = Vec::with_capacity(subs.len());

        for sub in subs.drain(..) {
            let delivered = if terminal {
                sub.tx.send(event.clone()).await.is_ok()
            } else {
                match sub.tx.try_send(event.clone()) {
                    Ok(()) => true,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        debug!(job_id = %job_id, subscriber = sub.id, "dropping progress event, subscriber mailbox full");
                        true
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => false,
                }
            };
            if delivered {
                still_connected.push(sub);
            }
        }

        if terminal || still_connected.is_empty() {
            rooms.rooms.remove(&job_id);
        } else {
            *subs = still_connected;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_emitted_events() {
        let channel = PushChannel::new();
        let job_id = JobId::from_string("j1");
        let (mut rx, _id) = channel.subscribe(&job_id).await;

        channel.emit_started(&job_id).await;
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, PushEvent::ProcessingStarted { .. }));
    }

    #[tokio::test]
    async fn terminal_event_closes_the_room() {
        let channel = PushChannel::new();
        let job_id = JobId::from_string("j1");
        let (mut rx, _id) = channel.subscribe(&job_id).await;

        channel.emit_cancelled(&job_id).await;
        let event = rx.recv().await.unwrap();
        assert!(event.is_terminal());

        // the room was torn down on the terminal event, so this is a no-op
        channel.emit_progress(&job_id, 0.5, "x", "y").await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn events_with_no_subscriber_are_dropped_silently() {
        let channel = PushChannel::new();
        let job_id = JobId::from_string("j1");
        // no subscribe call
        channel.emit_progress(&job_id, 0.1, "x", "y").await;
    }

    #[tokio::test]
    async fn unsubscribe_removes_from_room() {
        let channel = PushChannel::new();
        let job_id = JobId::from_string("j1");
        let (_rx, id) = channel.subscribe(&job_id).await;
        channel.unsubscribe(&job_id, id).await;

        // the room must now be empty; emitting should not panic
        channel.emit_progress(&job_id, 0.2, "x", "y").await;
    }

    #[tokio::test]
    async fn full_mailbox_drops_progress_but_not_connection() {
        let channel = PushChannel::new();
        let job_id = JobId::from_string("j1");
        let (mut rx, _id) = channel.subscribe(&job_id).await;

        for i in 0..(SUBSCRIBER_BUFFER_SIZE + 5) {
            channel.emit_progress(&job_id, i as f64 / 100.0, "x", "y").await;
        }
        // the mailbox is now full; the terminal send must still get through
        // once the receiver starts draining, so emit it concurrently.
        let emitter = channel.clone();
        let emitter_job = job_id.clone();
        let emit_task = tokio::spawn(async move {
            emitter
                .emit_completed(
                    &emitter_job,
                    ResultBundle {
                        artifact_path: "/tmp/a.mp4".to_string(),
                        thumbnail_path: "/tmp/a.jpg".to_string(),
                        duration_secs: 1.0,
                        file_size_bytes: 1,
                        format: "mp4".to_string(),
                        resolution: "1080x1920".to_string(),
                    },
                )
                .await;
        });

        let mut saw_terminal = false;
        while let Some(event) = rx.recv().await {
            if event.is_terminal() {
                saw_terminal = true;
                break;
            }
        }
        emit_task.await.unwrap();
        assert!(saw_terminal);
    }
}
