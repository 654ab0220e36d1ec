//! Job definitions for the asynchronous video-synthesis pipeline.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::aspect_ratio::AspectRatio;
use crate::subtitle::SubtitlePolicy;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Job lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Waiting in the priority queue.
    #[default]
    Pending,
    /// Taken by a worker, attempt not yet reported progress.
    Started,
    /// Attempt is actively running stages.
    Processing,
    /// Attempt completed successfully.
    Success,
    /// Attempt failed with no retry remaining.
    Failure,
    /// Attempt was cancelled.
    Cancelled,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Started => "started",
            JobState::Processing => "processing",
            JobState::Success => "success",
            JobState::Failure => "failure",
            JobState::Cancelled => "cancelled",
        }
    }

    /// Terminal states stop all progress emissions for the attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Success | JobState::Failure | JobState::Cancelled)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse priority grouping derived from a 1..10 integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Ord, PartialOrd)]
#[serde(rename_all = "snake_case")]
pub enum PriorityClass {
    /// Runs before Default and Low. Derived from priority 1-3.
    High = 0,
    /// Derived from priority 4-7.
    Default = 1,
    /// Derived from priority 8-10.
    Low = 2,
}

impl PriorityClass {
    /// Map a 1..10 priority integer to its coarse class.
    ///
    /// 1-3 -> High, 4-7 -> Default, 8-10 -> Low. Values outside 1..10 are
    /// clamped before classification.
    pub fn from_priority(priority: u8) -> Self {
        let p = priority.clamp(1, 10);
        match p {
            1..=3 => PriorityClass::High,
            4..=7 => PriorityClass::Default,
            _ => PriorityClass::Low,
        }
    }
}

/// Source-type preference for scene visuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceTypePreference {
    /// Still images only.
    StockImage,
    /// Prefer a stock video clip, falling back to a still image.
    #[default]
    StockVideo,
}

/// The immutable set of knobs needed to run (or rerun) the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobRequest {
    /// Raw script text to synthesize.
    pub script_text: String,
    /// Script identifier, opaque to the core.
    pub script_id: String,
    /// BCP-47-ish language/locale code, e.g. "en-US".
    pub locale: String,
    /// Target platform code (tiktok, youtube, youtube_shorts, ...).
    pub platform: String,
    /// Target aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Opaque voice selector resolved by the TTS collaborator.
    pub voice_selector: String,
    /// Subtitle generation policy.
    pub subtitle_policy: SubtitlePolicy,
    /// Preferred visual source type.
    #[serde(default)]
    pub source_type_preference: SourceTypePreference,
    /// Priority, 1 (highest) to 10 (lowest). Default 5.
    #[serde(default = "default_priority")]
    pub priority: u8,
}

fn default_priority() -> u8 {
    5
}

/// Result bundle recorded on SUCCESS.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResultBundle {
    /// Absolute path to the encoded artifact.
    pub artifact_path: String,
    /// Absolute path to the generated thumbnail.
    pub thumbnail_path: String,
    /// Duration of the final artifact, in seconds.
    pub duration_secs: f64,
    /// Size of the artifact file, in bytes.
    pub file_size_bytes: u64,
    /// Container format descriptor, e.g. "mp4".
    pub format: String,
    /// Resolution descriptor, e.g. "1080x1920".
    pub resolution: String,
}

/// The central job record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Unique job ID.
    pub id: JobId,
    /// Owning user, opaque identifier.
    pub user_id: String,
    /// Coarse priority class derived from `request.priority`.
    pub priority_class: PriorityClass,
    /// Maximum number of retries allowed.
    pub max_retries: u32,
    /// Current lifecycle state.
    pub state: JobState,
    /// Progress fraction in [0.0, 1.0].
    pub progress: f64,
    /// Human-readable progress message.
    pub progress_message: String,
    /// Fixed small step label, e.g. "audio_generation".
    pub progress_step: String,
    /// Result bundle, present only on SUCCESS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultBundle>,
    /// Error message, present only on FAILURE.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Optional stack/trace descriptor, present only on FAILURE.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_trace: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Set on first transition into PROCESSING.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Set on entering SUCCESS, FAILURE, or CANCELLED.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Monotonic retry counter.
    pub retry_count: u32,
    /// The immutable request payload.
    pub request: JobRequest,
}

impl Job {
    /// Create a new job in the PENDING state.
    pub fn new(user_id: impl Into<String>, request: JobRequest, max_retries: u32) -> Self {
        let priority_class = PriorityClass::from_priority(request.priority);
        let now = Utc::now();

        Self {
            id: JobId::new(),
            user_id: user_id.into(),
            priority_class,
            max_retries,
            state: JobState::Pending,
            progress: 0.0,
            progress_message: String::new(),
            progress_step: "queued".to_string(),
            result: None,
            error_message: None,
            error_trace: None,
            created_at: now,
            started_at: None,
            completed_at: None,
            retry_count: 0,
            request,
        }
    }

    /// Transition PENDING -> STARTED. Idempotent: a second call while
    /// already STARTED or PROCESSING is a no-op and does not move
    /// `started_at`.
    pub fn mark_started(&mut self) {
        if matches!(self.state, JobState::Started | JobState::Processing) {
            return;
        }
        self.state = JobState::Started;
        self.started_at = Some(Utc::now());
    }

    /// Record progress. The first call after `mark_started` advances the
    /// state to PROCESSING. Progress must be non-decreasing within an
    /// attempt; callers are expected to uphold that, this only clamps to
    /// [0.0, 1.0].
    pub fn mark_progress(&mut self, fraction: f64, message: impl Into<String>, step: impl Into<String>) {
        if self.state == JobState::Started {
            self.state = JobState::Processing;
        }
        self.progress = fraction.clamp(0.0, 1.0);
        self.progress_message = message.into();
        self.progress_step = step.into();
    }

    /// Transition into SUCCESS.
    pub fn mark_success(&mut self, result: ResultBundle) {
        self.state = JobState::Success;
        self.progress = 1.0;
        self.progress_step = "completed".to_string();
        self.result = Some(result);
        self.completed_at = Some(Utc::now());
    }

    /// Transition into FAILURE, recording the error.
    pub fn mark_failure(&mut self, error: impl Into<String>, trace: Option<String>) {
        self.state = JobState::Failure;
        self.error_message = Some(error.into());
        self.error_trace = trace;
        self.completed_at = Some(Utc::now());
    }

    /// Transition into CANCELLED. Idempotent: a no-op on an already
    /// terminal job.
    pub fn mark_cancelled(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        self.state = JobState::Cancelled;
        self.completed_at = Some(Utc::now());
    }

    /// Whether this job is eligible for an automatic retry after a FAILURE.
    pub fn can_retry(&self) -> bool {
        self.state == JobState::Failure && self.retry_count < self.max_retries
    }

    /// Reset the job for a new attempt: increments the retry counter,
    /// resets progress, clears error fields, and returns to PENDING.
    pub fn prepare_retry(&mut self) {
        self.retry_count += 1;
        self.progress = 0.0;
        self.progress_message.clear();
        self.progress_step = "queued".to_string();
        self.error_message = None;
        self.error_trace = None;
        self.started_at = None;
        self.completed_at = None;
        self.state = JobState::Pending;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitle::{SubtitlePolicy, SubtitleStyle};

    fn sample_request() -> JobRequest {
        JobRequest {
            script_text: "Hello world. This is a test.".to_string(),
            script_id: "script-1".to_string(),
            locale: "en-US".to_string(),
            platform: "youtube_shorts".to_string(),
            aspect_ratio: AspectRatio::Ratio9x16,
            voice_selector: "voice-1".to_string(),
            subtitle_policy: SubtitlePolicy {
                enabled: true,
                style: SubtitleStyle::Standard,
                words_per_line: 5,
            },
            source_type_preference: SourceTypePreference::StockVideo,
            priority: 5,
        }
    }

    #[test]
    fn priority_class_boundaries() {
        assert_eq!(PriorityClass::from_priority(1), PriorityClass::High);
        assert_eq!(PriorityClass::from_priority(3), PriorityClass::High);
        assert_eq!(PriorityClass::from_priority(4), PriorityClass::Default);
        assert_eq!(PriorityClass::from_priority(7), PriorityClass::Default);
        assert_eq!(PriorityClass::from_priority(8), PriorityClass::Low);
        assert_eq!(PriorityClass::from_priority(10), PriorityClass::Low);
    }

    #[test]
    fn new_job_is_pending() {
        let job = Job::new("u1", sample_request(), 3);
        assert_eq!(job.state, JobState::Pending);
        assert_eq!(job.progress, 0.0);
        assert_eq!(job.priority_class, PriorityClass::Default);
    }

    #[test]
    fn mark_started_is_idempotent() {
        let mut job = Job::new("u1", sample_request(), 3);
        job.mark_started();
        let first = job.started_at;
        job.mark_progress(0.3, "narrating", "audio_generation");
        job.mark_started();
        assert_eq!(job.started_at, first);
        assert_eq!(job.state, JobState::Processing);
    }

    #[test]
    fn mark_cancelled_is_idempotent_on_terminal() {
        let mut job = Job::new("u1", sample_request(), 3);
        job.mark_started();
        job.mark_success(ResultBundle {
            artifact_path: "/tmp/a.mp4".to_string(),
            thumbnail_path: "/tmp/a.jpg".to_string(),
            duration_secs: 10.0,
            file_size_bytes: 1024,
            format: "mp4".to_string(),
            resolution: "1080x1920".to_string(),
        });
        let completed_at = job.completed_at;
        job.mark_cancelled();
        assert_eq!(job.state, JobState::Success);
        assert_eq!(job.completed_at, completed_at);
    }

    #[test]
    fn retry_resets_progress_and_state() {
        let mut job = Job::new("u1", sample_request(), 3);
        job.mark_started();
        job.mark_progress(0.6, "composing", "video_composition");
        job.mark_failure("narration failed", None);
        assert!(job.can_retry());
        job.prepare_retry();
        assert_eq!(job.state, JobState::Pending);
        assert_eq!(job.progress, 0.0);
        assert_eq!(job.retry_count, 1);
        assert!(job.error_message.is_none());
    }

    #[test]
    fn retry_exhausted_after_max() {
        let mut job = Job::new("u1", sample_request(), 1);
        job.mark_failure("boom", None);
        assert!(job.can_retry());
        job.prepare_retry();
        job.mark_failure("boom again", None);
        assert!(!job.can_retry());
    }
}
