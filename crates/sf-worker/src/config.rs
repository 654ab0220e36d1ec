//! Worker pool configuration.

use std::time::Duration;

use sf_pipeline::PipelineConfig;

const DEFAULT_CONCURRENCY: usize = 3;
const DEFAULT_RETRY_COOLDOWN_SECS: u64 = 60;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_STALE_SCAN_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum number of attempts running at once.
    pub concurrency: usize,
    /// Passed straight through to the driver for soft-deadline enforcement.
    pub pipeline: PipelineConfig,
    /// Cooldown applied to the queue before a retried job becomes eligible
    /// for redelivery again.
    pub retry_cooldown: Duration,
    /// Retry budget assigned to freshly created jobs.
    pub max_retries: u32,
    /// How often the stale-job detector scans the heartbeat registry.
    pub stale_scan_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            pipeline: PipelineConfig::default(),
            retry_cooldown: Duration::from_secs(DEFAULT_RETRY_COOLDOWN_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            stale_scan_interval: Duration::from_secs(DEFAULT_STALE_SCAN_INTERVAL_SECS),
        }
    }
}

impl WorkerConfig {
    pub fn from_env() -> Self {
        let concurrency = std::env::var("WORKER_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CONCURRENCY);
        let retry_cooldown = std::env::var("RETRY_COOLDOWN_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RETRY_COOLDOWN_SECS);
        let max_retries = std::env::var("JOB_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_RETRIES);
        let stale_scan_interval = std::env::var("STALE_SCAN_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_STALE_SCAN_INTERVAL_SECS);

        Self {
            concurrency,
            pipeline: PipelineConfig::from_env(),
            retry_cooldown: Duration::from_secs(retry_cooldown),
            max_retries,
            stale_scan_interval: Duration::from_secs(stale_scan_interval),
        }
    }
}
