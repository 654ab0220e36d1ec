//! Shared error taxonomy for the job-execution subsystem.
//!
//! Every crate in the workspace that can fail in a way visible to a caller
//! or to the pipeline driver's retry logic reports one of these kinds,
//! either directly or wrapped with `#[from]` at the crate boundary. This
//! keeps the retry-vs-terminal decision in the driver centered on a single
//! vocabulary instead of each crate inventing its own.

use thiserror::Error;

/// Result type aliased to [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;

/// A core error kind, shared by the store, queue, pipeline, and API crates.
#[derive(Debug, Error, Clone)]
pub enum CoreError {
    /// Client-supplied input failed validation. Never retried.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The caller has exceeded their rolling submission cap. Never retried.
    #[error("rate limited")]
    RateLimited,

    /// The requested entity does not exist. Not an error condition by itself.
    #[error("not found")]
    NotFound,

    /// The backing store is unreachable. Internal and transient.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Segmentation produced zero scenes. Job is marked FAILURE, not retried.
    #[error("script invalid: {0}")]
    ScriptInvalid(String),

    /// The TTS collaborator failed for a scene. Consumes a retry if available.
    #[error("narration failed: {0}")]
    NarrationFailed(String),

    /// The compositor failed to produce an artifact. Consumes a retry if available.
    #[error("composition failed: {0}")]
    CompositionFailed(String),

    /// The attempt exceeded its soft or hard deadline. Consumes a retry if available.
    #[error("timed out")]
    TimedOut,

    /// The attempt was cancelled. Terminal, distinct from failure.
    #[error("cancelled")]
    Cancelled,

    /// The queue or worker pool is shutting down.
    #[error("shutting down")]
    ShuttingDown,

    /// The requested artifact is not yet ready (job not in SUCCESS).
    #[error("not ready")]
    NotReady,

    /// The requested artifact was ready but the file is gone.
    #[error("gone")]
    Gone,
}

impl CoreError {
    /// Whether a failure of this kind should consume a retry attempt and
    /// re-offer the job, per the state machine in the pipeline driver.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::NarrationFailed(_) | CoreError::CompositionFailed(_) | CoreError::TimedOut
        )
    }
}
