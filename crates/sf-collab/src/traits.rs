//! Collaborator contracts consumed by the pipeline driver.
//!
//! Each trait is deliberately narrow: one capability, one method family,
//! modeled on the external services the driver calls out to (sentence
//! segmentation, text-to-speech, stock-asset search, media
//! composition/probing, subtitle generation). Implementations live in
//! [`crate::local`] (offline, ffmpeg-backed) and [`crate::mock`]
//! (scripted, for driver tests).

use async_trait::async_trait;

use sf_models::{Scene, SubtitleSegment, TransitionKind};

use crate::error::CollabResult;

/// Splits a script into narration scenes.
#[async_trait]
pub trait Segmenter: Send + Sync {
    /// Returns an ordered, non-empty list of scenes, or a
    /// [`CollabError`](crate::error::CollabError) if the text yields none.
    async fn segment(&self, script_text: &str, locale: &str) -> CollabResult<Vec<Scene>>;
}

/// Converts narration text to spoken audio.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Returns the local path to the synthesized audio file.
    async fn synthesize(&self, text: &str, locale: &str, voice: &str) -> CollabResult<String>;
}

/// Measures the duration of a media file.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn duration_secs(&self, file_path: &str) -> CollabResult<f64>;
}

/// Orientation hint passed to the asset provider, derived from the
/// requested aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
    Square,
}

/// Finds a visual asset (stock still or clip) for a scene's narration text.
#[async_trait]
pub trait AssetProvider: Send + Sync {
    /// Never fails: a hard failure is absorbed into a solid-color
    /// placeholder path, per the driver's "visual acquisition never fails
    /// a job" policy.
    async fn acquire(&self, scene_text: &str, orientation: Orientation) -> String;
}

/// One scene's inputs to the compositor, in final-video order.
#[derive(Debug, Clone)]
pub struct CompositionSegment {
    pub audio_path: String,
    pub visual_path: String,
    pub duration_secs: f64,
    pub transition: TransitionKind,
}

/// Combines narrated scenes into one encoded artifact, and post-processes it.
#[async_trait]
pub trait Compositor: Send + Sync {
    /// Composes the ordered segments into a single container file at the
    /// given (width, height). Returns the artifact path.
    async fn compose(&self, segments: &[CompositionSegment], resolution: (u32, u32)) -> CollabResult<String>;

    /// Burns the given subtitle file into the video, returning the path to
    /// the new artifact (the caller replaces the original atomically).
    async fn burn_subtitles(&self, video_path: &str, subtitle_path: &str) -> CollabResult<String>;

    /// Extracts a still frame at `at_secs` and scales it to `resolution`.
    async fn extract_thumbnail(&self, video_path: &str, at_secs: f64, resolution: (u32, u32)) -> CollabResult<String>;
}

/// Produces timed subtitle segments for one scene's audio and text.
#[async_trait]
pub trait SubtitleGenerator: Send + Sync {
    async fn generate(
        &self,
        audio_path: &str,
        text: &str,
        words_per_line: u8,
    ) -> CollabResult<Vec<SubtitleSegment>>;
}
