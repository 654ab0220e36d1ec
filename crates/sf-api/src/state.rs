//! Shared application state.

use std::sync::Arc;

use sf_pipeline::CancellationRegistry;
use sf_push::PushChannel;
use sf_queue::PriorityQueue;
use sf_ratelimit::RateLimiter;
use sf_store::JobStore;

use crate::config::ApiConfig;

/// Bundle of every service a handler might need, shared across the router.
///
/// The worker pool runs in this same process (see `main.rs`): the queue,
/// push channel, and cancellation registry are all in-process constructs
/// with no durable backing of their own, so the API and the worker must
/// share one instance of each by value rather than coordinate across
/// processes.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: JobStore,
    pub queue: PriorityQueue,
    pub push: PushChannel,
    pub rate_limiter: RateLimiter,
    pub cancellations: Arc<CancellationRegistry>,
    pub max_retries: u32,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: ApiConfig,
        store: JobStore,
        queue: PriorityQueue,
        push: PushChannel,
        rate_limiter: RateLimiter,
        cancellations: Arc<CancellationRegistry>,
        max_retries: u32,
    ) -> Self {
        Self {
            config,
            store,
            queue,
            push,
            rate_limiter,
            cancellations,
            max_retries,
        }
    }
}
