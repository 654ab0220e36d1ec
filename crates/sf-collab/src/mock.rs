//! Scripted collaborator implementations for driver and worker tests.
//!
//! Each mock returns a fixed, configurable result and optionally fails
//! its first N calls before succeeding, which is what the transient
//! narration/composition failure scenarios need: the driver's first
//! attempt fails at a given stage, consumes a retry, and the second
//! attempt succeeds.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use sf_models::{Scene, SubtitleSegment, TransitionKind};

use crate::error::{CollabError, CollabResult};
use crate::traits::{AssetProvider, CompositionSegment, Compositor, MediaProbe, Orientation, Segmenter, SubtitleGenerator, TextToSpeech};

/// Returns a fixed scene list (or a fixed error) on every call.
pub struct ScriptedSegmenter {
    result: Mutex<CollabResult<Vec<Scene>>>,
}

impl ScriptedSegmenter {
    pub fn returning(scenes: Vec<Scene>) -> Self {
        Self { result: Mutex::new(Ok(scenes)) }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self { result: Mutex::new(Err(CollabError::new(message))) }
    }

    /// Two scenes with short narration text, for happy-path tests.
    pub fn two_scenes() -> Self {
        Self::returning(vec![
            Scene::new(0, "Hello world.", TransitionKind::Fade),
            Scene::new(1, "This is a test.", TransitionKind::Fade),
        ])
    }
}

#[async_trait]
impl Segmenter for ScriptedSegmenter {
    async fn segment(&self, _script_text: &str, _locale: &str) -> CollabResult<Vec<Scene>> {
        self.result.lock().unwrap().clone()
    }
}

/// Counts calls and fails the first `fail_first_n` of them, then returns a
/// path derived from the call index.
pub struct ScriptedTts {
    calls: AtomicU32,
    fail_first_n: u32,
}

impl ScriptedTts {
    pub fn new() -> Self {
        Self { calls: AtomicU32::new(0), fail_first_n: 0 }
    }

    pub fn failing_first_n_calls(n: u32) -> Self {
        Self { calls: AtomicU32::new(0), fail_first_n: n }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedTts {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextToSpeech for ScriptedTts {
    async fn synthesize(&self, _text: &str, _locale: &str, _voice: &str) -> CollabResult<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.fail_first_n {
            return Err(CollabError::new("injected narration failure"));
        }
        Ok(format!("/tmp/mock-audio-{call}.mp3"))
    }
}

/// Returns a fixed duration for every probed file.
pub struct ScriptedProbe {
    duration_secs: f64,
}

impl ScriptedProbe {
    pub fn returning(duration_secs: f64) -> Self {
        Self { duration_secs }
    }
}

#[async_trait]
impl MediaProbe for ScriptedProbe {
    async fn duration_secs(&self, _file_path: &str) -> CollabResult<f64> {
        Ok(self.duration_secs)
    }
}

/// Always succeeds, per the real contract's "never fails a job" policy.
pub struct ScriptedAssetProvider {
    path: String,
}

impl ScriptedAssetProvider {
    pub fn returning(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ScriptedAssetProvider {
    fn default() -> Self {
        Self::returning("/tmp/mock-placeholder.jpg")
    }
}

#[async_trait]
impl AssetProvider for ScriptedAssetProvider {
    async fn acquire(&self, _scene_text: &str, _orientation: Orientation) -> String {
        self.path.clone()
    }
}

/// Counts `compose` calls and fails the first `fail_first_n` of them.
pub struct ScriptedCompositor {
    compose_calls: AtomicU32,
    fail_first_n: u32,
    artifact_path: String,
    thumbnail_path: String,
}

impl ScriptedCompositor {
    pub fn new() -> Self {
        Self {
            compose_calls: AtomicU32::new(0),
            fail_first_n: 0,
            artifact_path: "/tmp/mock-artifact.mp4".to_string(),
            thumbnail_path: "/tmp/mock-thumb.jpg".to_string(),
        }
    }

    pub fn failing_first_n_calls(n: u32) -> Self {
        Self { fail_first_n: n, ..Self::new() }
    }
}

impl Default for ScriptedCompositor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Compositor for ScriptedCompositor {
    async fn compose(&self, segments: &[CompositionSegment], _resolution: (u32, u32)) -> CollabResult<String> {
        let call = self.compose_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if segments.is_empty() {
            return Err(CollabError::new("cannot compose an empty segment list"));
        }
        if call <= self.fail_first_n {
            return Err(CollabError::new("injected composition failure"));
        }
        Ok(self.artifact_path.clone())
    }

    async fn burn_subtitles(&self, _video_path: &str, _subtitle_path: &str) -> CollabResult<String> {
        Ok(self.artifact_path.clone())
    }

    async fn extract_thumbnail(&self, _video_path: &str, _at_secs: f64, _resolution: (u32, u32)) -> CollabResult<String> {
        Ok(self.thumbnail_path.clone())
    }
}

/// Returns one fixed-length segment per word group, ignoring real audio.
pub struct ScriptedSubtitleGenerator;

#[async_trait]
impl SubtitleGenerator for ScriptedSubtitleGenerator {
    async fn generate(&self, _audio_path: &str, text: &str, words_per_line: u8) -> CollabResult<Vec<SubtitleSegment>> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let words_per_line = words_per_line.max(1) as usize;
        Ok(words
            .chunks(words_per_line)
            .enumerate()
            .map(|(i, chunk)| SubtitleSegment {
                text: chunk.join(" "),
                start_secs: i as f64,
                end_secs: (i + 1) as f64,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_tts_fails_then_succeeds() {
        let tts = ScriptedTts::failing_first_n_calls(1);
        assert!(tts.synthesize("hi", "en-US", "v1").await.is_err());
        assert!(tts.synthesize("hi", "en-US", "v1").await.is_ok());
    }

    #[tokio::test]
    async fn scripted_compositor_rejects_empty_segments() {
        let compositor = ScriptedCompositor::new();
        let result = compositor.compose(&[], (1920, 1080)).await;
        assert!(result.is_err());
    }
}
