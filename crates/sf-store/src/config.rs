//! Job store configuration.

/// Default time-to-live for a job record, in seconds (24 hours).
pub const DEFAULT_JOB_TTL_SECS: u64 = 86_400;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub redis_url: String,
    pub job_ttl_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            job_ttl_secs: DEFAULT_JOB_TTL_SECS,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            job_ttl_secs: std::env::var("JOB_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_JOB_TTL_SECS),
        }
    }
}
