//! Bounded-concurrency job executor.
//!
//! Pulls job ids off the [`PriorityQueue`], acquires a semaphore permit per
//! attempt, and drives each one through [`sf_pipeline::PipelineDriver`]
//! inside a hard timeout. A startup recovery scan re-offers jobs left
//! PENDING by a crashed previous process, since the queue itself is
//! in-process and not durable.

use std::sync::Arc;

use tokio::sync::{watch, Semaphore};
use tracing::{error, info, warn};

use sf_collab::{AssetProvider, Compositor, MediaProbe, Segmenter, SubtitleGenerator, TextToSpeech};
use sf_models::{CoreError, JobState};
use sf_pipeline::{AttemptObserver, CancellationRegistry, PipelineDriver};
use sf_push::PushChannel;
use sf_queue::{PriorityQueue, Taken};
use sf_store::JobStore;

use crate::config::WorkerConfig;
use crate::heartbeat::HeartbeatRegistry;
use crate::stale::StaleJobDetector;

/// Owns everything needed to run attempts and keeps the background
/// services (retry-cooldown timer, stale-job detector) alive for as long
/// as the pool itself lives.
pub struct WorkerPool {
    config: WorkerConfig,
    store: JobStore,
    queue: PriorityQueue,
    push: PushChannel,
    driver: Arc<PipelineDriver>,
    semaphore: Arc<Semaphore>,
    cancellations: Arc<CancellationRegistry>,
    heartbeats: Arc<HeartbeatRegistry>,
    shutdown: watch::Sender<bool>,
}

#[allow(clippy::too_many_arguments)]
impl WorkerPool {
    pub fn new(
        config: WorkerConfig,
        store: JobStore,
        queue: PriorityQueue,
        push: PushChannel,
        segmenter: Arc<dyn Segmenter>,
        tts: Arc<dyn TextToSpeech>,
        probe: Arc<dyn MediaProbe>,
        asset_provider: Arc<dyn AssetProvider>,
        compositor: Arc<dyn Compositor>,
        subtitle_generator: Arc<dyn SubtitleGenerator>,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.concurrency));
        let driver = Arc::new(PipelineDriver::new(
            store.clone(),
            queue.clone(),
            push.clone(),
            segmenter,
            tts,
            probe,
            asset_provider,
            compositor,
            subtitle_generator,
            config.pipeline.clone(),
        ));
        let (shutdown, _) = watch::channel(false);

        Self {
            config,
            store,
            queue,
            push,
            driver,
            semaphore,
            cancellations: Arc::new(CancellationRegistry::new()),
            heartbeats: Arc::new(HeartbeatRegistry::new()),
            shutdown,
        }
    }

    pub fn cancellations(&self) -> Arc<CancellationRegistry> {
        Arc::clone(&self.cancellations)
    }

    /// Re-offers every job the store still considers PENDING. Covers jobs
    /// accepted by a previous process that never got a chance to run.
    pub async fn recover_pending(&self) -> usize {
        let pending = match self.store.list_by_status(JobState::Pending, 1000).await {
            Ok(jobs) => jobs,
            Err(e) => {
                error!("could not scan for pending jobs at startup: {e}");
                return 0;
            }
        };

        let mut recovered = 0;
        for job in pending {
            match self
                .queue
                .offer(job.id.clone(), job.priority_class)
                .await
            {
                Ok(()) => recovered += 1,
                Err(e) => warn!(job_id = %job.id, "failed to re-offer pending job: {e}"),
            }
        }
        if recovered > 0 {
            info!("recovered {recovered} pending job(s) from a previous run");
        }
        recovered
    }

    /// Starts the stale-job detector and the queue's retry-cooldown timer
    /// as background tasks. Returns their join handles so callers can
    /// observe them exit.
    pub fn spawn_background_services(&self) -> Vec<tokio::task::JoinHandle<()>> {
        let detector = StaleJobDetector::new(
            self.store.clone(),
            self.queue.clone(),
            self.push.clone(),
            Arc::clone(&self.heartbeats),
            self.config.stale_scan_interval,
        );
        let detector_handle = tokio::spawn(async move { detector.run().await });

        let queue = self.queue.clone();
        let cooldown_handle = tokio::spawn(async move {
            queue
                .run_retry_cooldown_timer(std::time::Duration::from_secs(1))
                .await
        });

        vec![detector_handle, cooldown_handle]
    }

    /// Runs the main dispatch loop until `shutdown` is signalled. Returns
    /// once every in-flight attempt has finished or the drain grace period
    /// elapses.
    pub async fn run(&self) {
        info!(
            concurrency = self.config.concurrency,
            "worker pool dispatch loop starting"
        );
        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            let permit = match Arc::clone(&self.semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            let mut rx = shutdown_rx.clone();
            let shutdown_signal = async move {
                let _ = rx.changed().await;
            };

            let job_id = match self.queue.take(shutdown_signal).await {
                Ok(Taken::Job(job_id)) => job_id,
                Ok(Taken::Cancelled) => {
                    drop(permit);
                    break;
                }
                Err(e) => {
                    warn!("queue closed while waiting for work: {e}");
                    drop(permit);
                    break;
                }
            };

            let driver = Arc::clone(&self.driver);
            let heartbeats = Arc::clone(&self.heartbeats);
            let cancellations = Arc::clone(&self.cancellations);
            let hard_timeout = self.config.pipeline.hard_timeout;
            let store = self.store.clone();

            tokio::spawn(async move {
                let _permit = permit;
                let job = match store.get(&job_id).await {
                    Ok(job) => job,
                    Err(e) => {
                        warn!(%job_id, "could not load dequeued job, dropping attempt: {e}");
                        return;
                    }
                };
                if job.state.is_terminal() {
                    // cancelled (or otherwise resolved) while still pending in the
                    // queue; the queue has no removal-by-id so this is caught here.
                    return;
                }
                heartbeats.start(&job_id, job.user_id);
                let token = cancellations.register(job_id.clone()).await;

                let observer: Arc<dyn AttemptObserver> = heartbeats.clone();
                let outcome = tokio::time::timeout(
                    hard_timeout,
                    driver.run_attempt(&job_id, token, Some(observer)),
                )
                .await;

                match outcome {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(%job_id, "attempt ended with error: {e}"),
                    Err(_) => {
                        error!(%job_id, "attempt exceeded hard timeout, forcing failure");
                        let message = CoreError::TimedOut.to_string();
                        if let Err(e) = store.mark_failure(&job_id, message, None).await {
                            error!(%job_id, "could not record hard-timeout failure: {e}");
                        }
                    }
                }

                heartbeats.remove(&job_id);
                cancellations.remove(&job_id).await;
            });
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_collab::mock::{
        ScriptedAssetProvider, ScriptedCompositor, ScriptedSegmenter, ScriptedSubtitleGenerator,
        ScriptedTts,
    };
    use sf_store::StoreConfig;

    fn test_pool() -> WorkerPool {
        let store = JobStore::new(StoreConfig::default()).expect("client construction does not connect");
        let queue = PriorityQueue::from_env();
        let push = PushChannel::new();

        WorkerPool::new(
            WorkerConfig::default(),
            store,
            queue,
            push,
            Arc::new(ScriptedSegmenter::two_scenes()),
            Arc::new(ScriptedTts::new()),
            Arc::new(sf_collab::mock::ScriptedProbe::returning(10.0)),
            Arc::new(ScriptedAssetProvider::default()),
            Arc::new(ScriptedCompositor::new()),
            Arc::new(ScriptedSubtitleGenerator),
        )
    }

    #[test]
    fn cancellations_handle_is_shared_with_the_pool() {
        let pool = test_pool();
        let handle = pool.cancellations();
        let job_id = sf_models::JobId::from_string("j1");
        tokio_test::block_on(async {
            handle.register(job_id.clone()).await;
            assert!(handle.cancel(&job_id).await);
        });
    }

    #[tokio::test]
    async fn recover_pending_returns_zero_without_panicking_when_store_is_unreachable() {
        let pool = test_pool();
        let recovered = pool.recover_pending().await;
        assert_eq!(recovered, 0);
    }

    #[test]
    fn shutdown_flips_the_watch_channel() {
        let pool = test_pool();
        let mut rx = pool.shutdown.subscribe();
        assert!(!*rx.borrow());
        pool.shutdown();
        tokio_test::block_on(async {
            rx.changed().await.unwrap();
        });
        assert!(*rx.borrow());
    }
}
