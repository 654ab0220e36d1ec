//! Liveness tracking for in-flight attempts.
//!
//! The worker pool records a heartbeat each time a driver reports progress.
//! The stale-job background service (run by the worker pool) compares
//! heartbeats against a threshold to detect a crashed worker and recover
//! the orphaned job.

use chrono::{DateTime, Utc};

/// How long since the last heartbeat before a non-terminal job is
/// considered stale.
pub const STALE_THRESHOLD_SECS: i64 = 120;

/// Grace period for a job that has never reported a heartbeat (e.g. it is
/// still in the Initialize stage) before it is considered stale.
pub const STALE_GRACE_PERIOD_SECS: i64 = 180;

/// A liveness record for one in-flight attempt.
#[derive(Debug, Clone)]
pub struct Heartbeat {
    pub job_id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub last_beat: Option<DateTime<Utc>>,
}

impl Heartbeat {
    pub fn new(job_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            user_id: user_id.into(),
            started_at: Utc::now(),
            last_beat: None,
        }
    }

    /// Record a heartbeat at the current time.
    pub fn beat(&mut self) {
        self.last_beat = Some(Utc::now());
    }

    /// Whether this attempt appears stale: no heartbeat within
    /// `stale_threshold_secs` of the last one, or, if none was ever
    /// recorded, no heartbeat within `grace_period_secs` of start.
    pub fn is_stale(&self, stale_threshold_secs: i64, grace_period_secs: i64) -> bool {
        let now = Utc::now();
        match self.last_beat {
            Some(hb) => (now - hb).num_seconds() > stale_threshold_secs,
            None => (now - self.started_at).num_seconds() > grace_period_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_heartbeat_is_not_stale() {
        let hb = Heartbeat::new("j1", "u1");
        assert!(!hb.is_stale(STALE_THRESHOLD_SECS, STALE_GRACE_PERIOD_SECS));
    }

    #[test]
    fn missing_heartbeat_past_grace_period_is_stale() {
        let mut hb = Heartbeat::new("j1", "u1");
        hb.started_at = Utc::now() - chrono::Duration::seconds(200);
        assert!(hb.is_stale(60, 120));
    }

    #[test]
    fn recent_beat_clears_staleness() {
        let mut hb = Heartbeat::new("j1", "u1");
        hb.started_at = Utc::now() - chrono::Duration::seconds(200);
        hb.beat();
        assert!(!hb.is_stale(60, 120));
    }
}
