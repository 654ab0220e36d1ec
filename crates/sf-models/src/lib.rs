//! Shared data models for the scriptfactory backend.
//!
//! This crate provides the serde-serializable vocabulary shared by the
//! job store, priority queue, push channel, pipeline driver, and API
//! crates: the Job record and its state machine, the error taxonomy,
//! transient per-attempt scenes and subtitle segments, push-channel
//! events, and the aspect-ratio/transition enumerations.

pub mod aspect_ratio;
pub mod error;
pub mod heartbeat;
pub mod job;
pub mod push_event;
pub mod scene;
pub mod subtitle;
pub mod timestamp;

pub use aspect_ratio::{AspectRatio, TransitionKind};
pub use error::{CoreError, CoreResult};
pub use heartbeat::{Heartbeat, STALE_GRACE_PERIOD_SECS, STALE_THRESHOLD_SECS};
pub use job::{Job, JobId, JobRequest, JobState, PriorityClass, ResultBundle, SourceTypePreference};
pub use push_event::PushEvent;
pub use scene::{estimate_duration_secs, Scene, WORDS_PER_MINUTE};
pub use subtitle::{segments_are_well_ordered, SubtitlePolicy, SubtitleSegment, SubtitleStyle};
