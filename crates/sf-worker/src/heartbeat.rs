//! Liveness bookkeeping for in-flight attempts.
//!
//! The executor registers a [`sf_models::Heartbeat`] before dispatching an
//! attempt and wires this registry to the driver as an
//! [`sf_pipeline::AttemptObserver`], so every progress report refreshes it.
//! The stale-job detector reads the same registry to find attempts whose
//! worker has stopped reporting.

use std::collections::HashMap;
use std::sync::Mutex;

use sf_models::{Heartbeat, JobId};
use sf_pipeline::AttemptObserver;

#[derive(Default)]
pub struct HeartbeatRegistry {
    beats: Mutex<HashMap<String, Heartbeat>>,
}

impl HeartbeatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, job_id: &JobId, user_id: impl Into<String>) {
        let heartbeat = Heartbeat::new(job_id.as_str(), user_id);
        self.beats
            .lock()
            .expect("heartbeat registry mutex poisoned")
            .insert(job_id.as_str().to_string(), heartbeat);
    }

    pub fn remove(&self, job_id: &JobId) {
        self.beats
            .lock()
            .expect("heartbeat registry mutex poisoned")
            .remove(job_id.as_str());
    }

    /// Ids of jobs that have not reported a heartbeat recently enough,
    /// per `Heartbeat::is_stale`.
    pub fn stale_job_ids(&self, stale_threshold_secs: i64, grace_period_secs: i64) -> Vec<JobId> {
        self.beats
            .lock()
            .expect("heartbeat registry mutex poisoned")
            .values()
            .filter(|hb| hb.is_stale(stale_threshold_secs, grace_period_secs))
            .map(|hb| JobId::from_string(hb.job_id.clone()))
            .collect()
    }
}

impl AttemptObserver for HeartbeatRegistry {
    fn on_heartbeat(&self, job_id: &JobId) {
        if let Some(hb) = self
            .beats
            .lock()
            .expect("heartbeat registry mutex poisoned")
            .get_mut(job_id.as_str())
        {
            hb.beat();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_start_is_not_stale() {
        let registry = HeartbeatRegistry::new();
        let job_id = JobId::from_string("j1");
        registry.start(&job_id, "u1");
        assert!(registry.stale_job_ids(120, 180).is_empty());
    }

    #[test]
    fn removed_job_is_no_longer_tracked() {
        let registry = HeartbeatRegistry::new();
        let job_id = JobId::from_string("j1");
        registry.start(&job_id, "u1");
        registry.remove(&job_id);
        registry.on_heartbeat(&job_id);
        assert!(registry.stale_job_ids(0, 0).is_empty());
    }

    #[test]
    fn heartbeat_on_unknown_job_is_a_no_op() {
        let registry = HeartbeatRegistry::new();
        registry.on_heartbeat(&JobId::from_string("ghost"));
        assert!(registry.stale_job_ids(0, 0).is_empty());
    }
}
