//! Redis-backed Job Store.

use std::collections::HashMap;

use redis::AsyncCommands;
use tracing::{debug, warn};

use sf_models::{Job, JobId, JobRequest, JobState, ResultBundle};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::keys::{job_key, status_index_key, user_index_key, ALL_STATES};

/// Durable, indexed persistence for Job records.
#[derive(Clone)]
pub struct JobStore {
    client: redis::Client,
    config: StoreConfig,
}

impl JobStore {
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> StoreResult<Self> {
        Self::new(StoreConfig::from_env())
    }

    async fn conn(&self) -> StoreResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))
    }

    /// Create a new job in PENDING, writing the record and both secondary
    /// indexes in one pipelined round trip.
    pub async fn create(&self, user_id: impl Into<String>, request: JobRequest, max_retries: u32) -> StoreResult<Job> {
        let job = Job::new(user_id, request, max_retries);
        self.write_with_indexes(&job, None).await?;
        Ok(job)
    }

    pub async fn get(&self, job_id: &JobId) -> StoreResult<Job> {
        let mut conn = self.conn().await?;
        let payload: Option<String> = conn.get(job_key(job_id)).await?;
        match payload {
            Some(s) => Ok(serde_json::from_str(&s)?),
            None => Err(StoreError::NotFound),
        }
    }

    /// Replace the stored record. If `job.state` differs from the
    /// currently-stored state, the status indexes are repaired in the same
    /// pipeline.
    pub async fn update(&self, job: &Job) -> StoreResult<()> {
        let previous_state = self.get(&job.id).await.ok().map(|j| j.state);
        self.write_with_indexes(job, previous_state).await
    }

    async fn write_with_indexes(&self, job: &Job, previous_state: Option<JobState>) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        let payload = serde_json::to_string(job)?;
        let ttl = self.config.job_ttl_secs;
        let created_score = job.created_at.timestamp_millis() as f64;

        let mut pipe = redis::pipe();
        pipe.atomic()
            .set_ex(job_key(&job.id), &payload, ttl)
            .ignore()
            .zadd(user_index_key(&job.user_id), job.id.to_string(), created_score)
            .ignore()
            .expire(user_index_key(&job.user_id), ttl as i64)
            .ignore()
            .zadd(status_index_key(job.state), job.id.to_string(), created_score)
            .ignore()
            .expire(status_index_key(job.state), ttl as i64)
            .ignore();

        if let Some(prev) = previous_state {
            if prev != job.state {
                pipe.zrem(status_index_key(prev), job.id.to_string()).ignore();
            }
        }

        pipe.exec_async(&mut conn)
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?;
        Ok(())
    }

    pub async fn mark_started(&self, job_id: &JobId) -> StoreResult<Job> {
        let mut job = self.get(job_id).await?;
        job.mark_started();
        self.update(&job).await?;
        Ok(job)
    }

    pub async fn mark_progress(&self, job_id: &JobId, fraction: f64, message: impl Into<String>, step: impl Into<String>) -> StoreResult<Job> {
        let mut job = self.get(job_id).await?;
        job.mark_progress(fraction, message, step);
        self.update(&job).await?;
        Ok(job)
    }

    pub async fn mark_success(&self, job_id: &JobId, result: ResultBundle) -> StoreResult<Job> {
        let mut job = self.get(job_id).await?;
        job.mark_success(result);
        self.update(&job).await?;
        Ok(job)
    }

    pub async fn mark_failure(&self, job_id: &JobId, error: impl Into<String>, trace: Option<String>) -> StoreResult<Job> {
        let mut job = self.get(job_id).await?;
        job.mark_failure(error, trace);
        self.update(&job).await?;
        Ok(job)
    }

    pub async fn mark_cancelled(&self, job_id: &JobId) -> StoreResult<Job> {
        let mut job = self.get(job_id).await?;
        job.mark_cancelled();
        self.update(&job).await?;
        Ok(job)
    }

    pub async fn delete(&self, job_id: &JobId) -> StoreResult<bool> {
        let job = match self.get(job_id).await {
            Ok(job) => job,
            Err(StoreError::NotFound) => return Ok(false),
            Err(e) => return Err(e),
        };
        let mut conn = self.conn().await?;
        let mut pipe = redis::pipe();
        pipe.atomic()
            .del(job_key(job_id))
            .ignore()
            .zrem(user_index_key(&job.user_id), job_id.to_string())
            .ignore()
            .zrem(status_index_key(job.state), job_id.to_string())
            .ignore();
        pipe.exec_async(&mut conn)
            .await
            .map_err(|e| StoreError::unavailable(e.to_string()))?;
        Ok(true)
    }

    /// Jobs owned by `user_id`, newest first.
    pub async fn list_by_user(&self, user_id: &str, limit: usize, offset: usize) -> StoreResult<Vec<Job>> {
        let mut conn = self.conn().await?;
        let start = offset as isize;
        let stop = (offset + limit).saturating_sub(1) as isize;
        let ids: Vec<String> = conn.zrevrange(user_index_key(user_id), start, stop).await?;
        self.fetch_many(&ids).await
    }

    /// Jobs in `state`, oldest first (so PENDING is drained in offer order).
    pub async fn list_by_status(&self, state: JobState, limit: usize) -> StoreResult<Vec<Job>> {
        let mut conn = self.conn().await?;
        let ids: Vec<String> = conn.zrange(status_index_key(state), 0, (limit.max(1) - 1) as isize).await?;
        self.fetch_many(&ids).await
    }

    async fn fetch_many(&self, ids: &[String]) -> StoreResult<Vec<Job>> {
        let mut jobs = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get(&JobId::from_string(id.clone())).await {
                Ok(job) => jobs.push(job),
                Err(StoreError::NotFound) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(jobs)
    }

    pub async fn counts_by_status(&self) -> StoreResult<HashMap<JobState, u64>> {
        let mut conn = self.conn().await?;
        let mut counts = HashMap::new();
        for state in ALL_STATES {
            let count: u64 = conn.zcard(status_index_key(state)).await?;
            counts.insert(state, count);
        }
        Ok(counts)
    }

    /// Evict terminal jobs older than `max_age_secs`. Returns the number
    /// of records removed.
    pub async fn evict_older_than(&self, max_age_secs: i64) -> StoreResult<u32> {
        let cutoff_ms = (chrono::Utc::now().timestamp_millis()) - max_age_secs * 1000;
        let mut removed = 0u32;

        for state in [JobState::Success, JobState::Failure, JobState::Cancelled] {
            let mut conn = self.conn().await?;
            let stale_ids: Vec<String> = conn.zrangebyscore(status_index_key(state), 0, cutoff_ms as f64).await?;
            for id in stale_ids {
                if self.delete(&JobId::from_string(id.clone())).await.unwrap_or(false) {
                    removed += 1;
                } else {
                    debug!(job_id = %id, "eviction candidate already gone");
                }
            }
        }

        Ok(removed)
    }

    pub async fn healthy(&self) -> bool {
        match self.conn().await {
            Ok(mut conn) => redis::cmd("PING").query_async::<String>(&mut conn).await.is_ok(),
            Err(e) => {
                warn!(error = %e, "job store health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> JobRequest {
        JobRequest {
            script_text: "Hello world.".to_string(),
            script_id: "s1".to_string(),
            locale: "en-US".to_string(),
            platform: "tiktok".to_string(),
            aspect_ratio: sf_models::AspectRatio::Ratio9x16,
            voice_selector: "voice-1".to_string(),
            subtitle_policy: sf_models::SubtitlePolicy::default(),
            source_type_preference: sf_models::SourceTypePreference::StockVideo,
            priority: 5,
        }
    }

    // These tests exercise only pure helpers; full round-trip behavior
    // against a live Redis instance is covered under tests/integration,
    // gated on a reachable REDIS_URL.

    #[test]
    fn keys_are_namespaced() {
        let job = Job::new("user-1", sample_request(), 3);
        assert_eq!(crate::keys::job_key(&job.id), format!("job:{}", job.id));
        assert_eq!(crate::keys::user_index_key("user-1"), "user:user-1:jobs");
        assert_eq!(crate::keys::status_index_key(JobState::Pending), "jobs:status:pending");
    }
}
