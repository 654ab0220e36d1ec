//! Pipeline driver configuration.

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SOFT_TIMEOUT_SECS: u64 = 1500;
const DEFAULT_HARD_TIMEOUT_SECS: u64 = 1800;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Base directory under which each attempt gets its own `{jobId}`
    /// working subdirectory, removed on every exit path.
    pub work_dir: PathBuf,
    /// Cooperative deadline: stages stop advancing past this and the
    /// attempt is recorded as `TimedOut`.
    pub soft_timeout: Duration,
    /// Deadline enforced by the worker pool around the whole attempt, used
    /// to force-unwind a driver that ignored its soft deadline.
    pub hard_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir().join("scriptfactory"),
            soft_timeout: Duration::from_secs(DEFAULT_SOFT_TIMEOUT_SECS),
            hard_timeout: Duration::from_secs(DEFAULT_HARD_TIMEOUT_SECS),
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let work_dir = std::env::var("PIPELINE_WORK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir().join("scriptfactory"));
        let soft_timeout = std::env::var("JOB_SOFT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SOFT_TIMEOUT_SECS);
        let hard_timeout = std::env::var("JOB_HARD_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_HARD_TIMEOUT_SECS);

        Self {
            work_dir,
            soft_timeout: Duration::from_secs(soft_timeout),
            hard_timeout: Duration::from_secs(hard_timeout),
        }
    }
}
