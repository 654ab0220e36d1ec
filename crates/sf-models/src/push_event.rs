//! Push channel event envelope.
//!
//! These are the wire messages delivered to subscribers of a job's room.
//! Event kinds follow the externally-documented names in §6; payload
//! fields are camelCase to match the rest of the service's WebSocket
//! surface.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::job::{JobId, ResultBundle};

/// A single job lifecycle event, tagged by kind.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    /// The attempt has begun running on a worker.
    ProcessingStarted {
        #[serde(rename = "jobId")]
        job_id: JobId,
        timestamp: DateTime<Utc>,
    },

    /// Progress advanced.
    ProgressUpdate {
        #[serde(rename = "jobId")]
        job_id: JobId,
        progress: f64,
        message: String,
        step: String,
        timestamp: DateTime<Utc>,
    },

    /// The attempt finished successfully.
    ProcessingCompleted {
        #[serde(rename = "jobId")]
        job_id: JobId,
        result: ResultBundle,
        timestamp: DateTime<Utc>,
    },

    /// The attempt failed terminally.
    ProcessingFailed {
        #[serde(rename = "jobId")]
        job_id: JobId,
        error: String,
        timestamp: DateTime<Utc>,
    },

    /// The attempt was cancelled.
    ProcessingCancelled {
        #[serde(rename = "jobId")]
        job_id: JobId,
        timestamp: DateTime<Utc>,
    },
}

impl PushEvent {
    pub fn started(job_id: JobId) -> Self {
        PushEvent::ProcessingStarted { job_id, timestamp: Utc::now() }
    }

    pub fn progress(job_id: JobId, progress: f64, message: impl Into<String>, step: impl Into<String>) -> Self {
        PushEvent::ProgressUpdate {
            job_id,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
            step: step.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn completed(job_id: JobId, result: ResultBundle) -> Self {
        PushEvent::ProcessingCompleted { job_id, result, timestamp: Utc::now() }
    }

    pub fn failed(job_id: JobId, error: impl Into<String>) -> Self {
        PushEvent::ProcessingFailed { job_id, error: error.into(), timestamp: Utc::now() }
    }

    pub fn cancelled(job_id: JobId) -> Self {
        PushEvent::ProcessingCancelled { job_id, timestamp: Utc::now() }
    }

    /// Whether this event kind is terminal: the channel must never drop a
    /// terminal event even under subscriber backpressure.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PushEvent::ProcessingCompleted { .. }
                | PushEvent::ProcessingFailed { .. }
                | PushEvent::ProcessingCancelled { .. }
        )
    }

    pub fn job_id(&self) -> &JobId {
        match self {
            PushEvent::ProcessingStarted { job_id, .. }
            | PushEvent::ProgressUpdate { job_id, .. }
            | PushEvent::ProcessingCompleted { job_id, .. }
            | PushEvent::ProcessingFailed { job_id, .. }
            | PushEvent::ProcessingCancelled { job_id, .. } => job_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_kinds_are_flagged() {
        let job_id = JobId::new();
        assert!(!PushEvent::started(job_id.clone()).is_terminal());
        assert!(!PushEvent::progress(job_id.clone(), 0.5, "m", "s").is_terminal());
        assert!(PushEvent::cancelled(job_id.clone()).is_terminal());
        assert!(PushEvent::failed(job_id, "boom").is_terminal());
    }

    #[test]
    fn serializes_with_snake_case_tag() {
        let event = PushEvent::started(JobId::from_string("j1"));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"processing_started\""));
        assert!(json.contains("\"jobId\":\"j1\""));
    }
}
