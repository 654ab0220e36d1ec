//! The pipeline driver: carries one job attempt through its eight stages.
//!
//! Initialize, Segment, Narrate (with visual acquisition folded in),
//! Compose, Subtitles, Thumbnail, and Metadata & Finalize. Stage
//! boundaries are where progress is reported and where cancellation and
//! the soft deadline are checked; a collaborator failure during Segment,
//! Narrate, or Compose ends the attempt, while a failure acquiring a
//! visual, generating subtitles, or extracting a thumbnail is absorbed
//! into a fallback and never fails the job.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::warn;

use sf_collab::local::export_to_srt;
use sf_collab::{AssetProvider, CompositionSegment, Compositor, MediaProbe, Orientation, Segmenter, SubtitleGenerator, TextToSpeech};
use sf_models::{AspectRatio, CoreError, CoreResult, JobId, ResultBundle, Scene};
use sf_push::PushChannel;
use sf_queue::PriorityQueue;
use sf_store::JobStore;

use crate::cancellation::CancellationToken;
use crate::config::PipelineConfig;

const STEP_INITIALIZATION: &str = "initialization";
const STEP_SCENE_PARSING: &str = "scene_parsing";
const STEP_AUDIO_GENERATION: &str = "audio_generation";
const STEP_VIDEO_COMPOSITION: &str = "video_composition";
const STEP_THUMBNAIL_GENERATION: &str = "thumbnail_generation";

const THUMBNAIL_RESOLUTION: (u32, u32) = (640, 360);
const THUMBNAIL_AT_SECS: f64 = 1.0;

/// A two-byte-marker JPEG (SOI immediately followed by EOI): the smallest
/// byte sequence a JPEG decoder will accept, used as the thumbnail
/// fallback when `extract_thumbnail` fails.
const PLACEHOLDER_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xD9];

/// Notified on every progress report, so the worker pool can record a
/// heartbeat without the driver knowing anything about stale-job
/// detection.
pub trait AttemptObserver: Send + Sync {
    fn on_heartbeat(&self, job_id: &JobId);
}

/// Runs job attempts against a fixed set of collaborators.
pub struct PipelineDriver {
    store: JobStore,
    queue: PriorityQueue,
    push: PushChannel,
    segmenter: Arc<dyn Segmenter>,
    tts: Arc<dyn TextToSpeech>,
    probe: Arc<dyn MediaProbe>,
    asset_provider: Arc<dyn AssetProvider>,
    compositor: Arc<dyn Compositor>,
    subtitle_generator: Arc<dyn SubtitleGenerator>,
    config: PipelineConfig,
}

impl PipelineDriver {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: JobStore,
        queue: PriorityQueue,
        push: PushChannel,
        segmenter: Arc<dyn Segmenter>,
        tts: Arc<dyn TextToSpeech>,
        probe: Arc<dyn MediaProbe>,
        asset_provider: Arc<dyn AssetProvider>,
        compositor: Arc<dyn Compositor>,
        subtitle_generator: Arc<dyn SubtitleGenerator>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            queue,
            push,
            segmenter,
            tts,
            probe,
            asset_provider,
            compositor,
            subtitle_generator,
            config,
        }
    }

    /// Runs one attempt of `job_id` to completion: a terminal job state
    /// (SUCCESS, FAILURE, or CANCELLED) is always written before this
    /// returns, except when the job store itself is unreachable, in which
    /// case the attempt aborts without mutating the job record at all.
    pub async fn run_attempt(
        &self,
        job_id: &JobId,
        cancel: CancellationToken,
        observer: Option<Arc<dyn AttemptObserver>>,
    ) -> CoreResult<()> {
        let deadline = Instant::now() + self.config.soft_timeout;

        if let Some(err) = Self::check_aborted(&cancel, deadline) {
            return self.finish_non_success(job_id, err).await;
        }

        let job = self.store.mark_started(job_id).await.map_err(CoreError::from)?;
        self.push.emit_started(job_id).await;
        Self::beat(&observer, job_id);

        let work_dir = self.config.work_dir.join(job_id.as_str());
        if let Err(e) = tokio::fs::create_dir_all(&work_dir).await {
            return self.finish_non_success(job_id, Self::io_err(e)).await;
        }
        self.report_progress(job_id, 0.05, "initializing working directory", STEP_INITIALIZATION, &observer)
            .await?;

        if let Some(err) = Self::check_aborted(&cancel, deadline) {
            return self.finish_non_success(job_id, err).await;
        }

        let mut scenes = match self.segmenter.segment(&job.request.script_text, &job.request.locale).await {
            Ok(scenes) if !scenes.is_empty() => scenes,
            Ok(_) => {
                return self
                    .finish_non_success(job_id, CoreError::ScriptInvalid("segmentation produced no scenes".to_string()))
                    .await
            }
            Err(e) => return self.finish_non_success(job_id, CoreError::ScriptInvalid(e.message().to_string())).await,
        };
        self.report_progress(job_id, 0.10, "script segmented into scenes", STEP_SCENE_PARSING, &observer)
            .await?;

        let orientation = orientation_for(job.request.aspect_ratio);
        let scene_count = scenes.len();
        for (idx, scene) in scenes.iter_mut().enumerate() {
            if let Some(err) = Self::check_aborted(&cancel, deadline) {
                return self.finish_non_success(job_id, err).await;
            }

            let audio_path = match self.tts.synthesize(&scene.text, &job.request.locale, &job.request.voice_selector).await {
                Ok(path) => path,
                Err(e) => return self.finish_non_success(job_id, CoreError::NarrationFailed(e.message().to_string())).await,
            };
            let measured = match self.probe.duration_secs(&audio_path).await {
                Ok(secs) => secs,
                Err(e) => return self.finish_non_success(job_id, CoreError::NarrationFailed(e.message().to_string())).await,
            };
            scene.set_measured_duration(measured);
            scene.audio_path = Some(audio_path);
            scene.visual_path = Some(self.asset_provider.acquire(&scene.text, orientation).await);

            let fraction = 0.30 + 0.30 * (idx + 1) as f64 / scene_count as f64;
            self.report_progress(
                job_id,
                fraction,
                format!("narrated scene {} of {}", idx + 1, scene_count),
                STEP_AUDIO_GENERATION,
                &observer,
            )
            .await?;
        }

        if let Some(err) = Self::check_aborted(&cancel, deadline) {
            return self.finish_non_success(job_id, err).await;
        }

        let resolution = job.request.aspect_ratio.resolution();
        let segments: Vec<CompositionSegment> = scenes
            .iter()
            .map(|s| CompositionSegment {
                audio_path: s.audio_path.clone().unwrap_or_default(),
                visual_path: s.visual_path.clone().unwrap_or_default(),
                duration_secs: s.duration_secs,
                transition: s.transition,
            })
            .collect();

        let mut artifact_path = match self.compositor.compose(&segments, resolution).await {
            Ok(path) => path,
            Err(e) => return self.finish_non_success(job_id, CoreError::CompositionFailed(e.message().to_string())).await,
        };
        self.report_progress(job_id, 0.80, "composed video", STEP_VIDEO_COMPOSITION, &observer).await?;

        if job.request.subtitle_policy.enabled {
            match self
                .burn_subtitles_if_possible(&artifact_path, &work_dir, &scenes, job.request.subtitle_policy.words_per_line, &cancel, deadline)
                .await
            {
                Ok(path) => {
                    artifact_path = path;
                    self.report_progress(job_id, 0.85, "generated subtitles", STEP_VIDEO_COMPOSITION, &observer)
                        .await?;
                }
                Err(err) => return self.finish_non_success(job_id, err).await,
            }
        }

        if let Some(err) = Self::check_aborted(&cancel, deadline) {
            return self.finish_non_success(job_id, err).await;
        }

        let thumbnail_path = match self.compositor.extract_thumbnail(&artifact_path, THUMBNAIL_AT_SECS, THUMBNAIL_RESOLUTION).await {
            Ok(path) => path,
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "thumbnail extraction failed, writing placeholder");
                self.write_placeholder_thumbnail(&work_dir).await
            }
        };
        self.report_progress(job_id, 0.95, "extracted thumbnail", STEP_THUMBNAIL_GENERATION, &observer)
            .await?;

        if let Some(err) = Self::check_aborted(&cancel, deadline) {
            return self.finish_non_success(job_id, err).await;
        }

        let duration_secs = match self.probe.duration_secs(&artifact_path).await {
            Ok(secs) => secs,
            Err(_) => scenes.iter().map(|s| s.duration_secs).sum(),
        };
        let file_size_bytes = tokio::fs::metadata(&artifact_path).await.map(|m| m.len()).unwrap_or(0);

        let result = ResultBundle {
            artifact_path,
            thumbnail_path,
            duration_secs,
            file_size_bytes,
            format: "mp4".to_string(),
            resolution: job.request.aspect_ratio.resolution_str(),
        };

        self.store.mark_success(job_id, result.clone()).await.map_err(CoreError::from)?;
        self.push.emit_completed(job_id, result).await;
        self.cleanup_working_dir(job_id).await;
        Ok(())
    }

    async fn report_progress(
        &self,
        job_id: &JobId,
        fraction: f64,
        message: impl Into<String>,
        step: &str,
        observer: &Option<Arc<dyn AttemptObserver>>,
    ) -> CoreResult<()> {
        let message = message.into();
        self.store
            .mark_progress(job_id, fraction, message.clone(), step)
            .await
            .map_err(CoreError::from)?;
        self.push.emit_progress(job_id, fraction, message, step).await;
        Self::beat(observer, job_id);
        Ok(())
    }

    fn beat(observer: &Option<Arc<dyn AttemptObserver>>, job_id: &JobId) {
        if let Some(observer) = observer {
            observer.on_heartbeat(job_id);
        }
    }

    fn check_aborted(cancel: &CancellationToken, deadline: Instant) -> Option<CoreError> {
        if cancel.is_cancelled() {
            Some(CoreError::Cancelled)
        } else if Instant::now() >= deadline {
            Some(CoreError::TimedOut)
        } else {
            None
        }
    }

    /// Generates and burns subtitles, folding per-scene timings onto the
    /// composed video's shared timeline. Any collaborator failure here is
    /// swallowed and the unsubtitled artifact is kept; only cancellation
    /// or the soft deadline propagates, since those must abort the whole
    /// attempt regardless of which stage they land in.
    async fn burn_subtitles_if_possible(
        &self,
        artifact_path: &str,
        work_dir: &Path,
        scenes: &[Scene],
        words_per_line: u8,
        cancel: &CancellationToken,
        deadline: Instant,
    ) -> Result<String, CoreError> {
        let mut all_segments = Vec::new();
        let mut cumulative = 0.0;

        for scene in scenes {
            if let Some(err) = Self::check_aborted(cancel, deadline) {
                return Err(err);
            }

            let audio_path = scene.audio_path.as_deref().unwrap_or_default();
            match self.subtitle_generator.generate(audio_path, &scene.text, words_per_line).await {
                Ok(segments) => all_segments.extend(segments.into_iter().map(|s| s.offset(cumulative))),
                Err(e) => {
                    warn!(error = %e, "subtitle generation failed for a scene, skipping subtitles entirely");
                    return Ok(artifact_path.to_string());
                }
            }
            cumulative += scene.duration_secs;
        }

        if all_segments.is_empty() {
            return Ok(artifact_path.to_string());
        }

        let srt_path = work_dir.join("subtitles.srt");
        if let Err(e) = tokio::fs::write(&srt_path, export_to_srt(&all_segments)).await {
            warn!(error = %e, "failed to write subtitle file, skipping subtitles");
            return Ok(artifact_path.to_string());
        }

        match self.compositor.burn_subtitles(artifact_path, &srt_path.to_string_lossy()).await {
            Ok(burned_path) => Ok(burned_path),
            Err(e) => {
                warn!(error = %e, "burning subtitles failed, keeping unsubtitled artifact");
                Ok(artifact_path.to_string())
            }
        }
    }

    async fn write_placeholder_thumbnail(&self, work_dir: &Path) -> String {
        let path = work_dir.join("thumbnail_placeholder.jpg");
        if let Err(e) = tokio::fs::write(&path, PLACEHOLDER_JPEG).await {
            warn!(error = %e, "failed to write placeholder thumbnail");
        }
        path.to_string_lossy().to_string()
    }

    /// Routes a non-success outcome to the right terminal transition,
    /// cleaning up the working directory first on every path.
    async fn finish_non_success(&self, job_id: &JobId, err: CoreError) -> CoreResult<()> {
        self.cleanup_working_dir(job_id).await;
        match err {
            CoreError::Cancelled => self.cancel_and_finish(job_id).await,
            other => self.fail_and_maybe_retry(job_id, other).await,
        }
    }

    async fn cancel_and_finish(&self, job_id: &JobId) -> CoreResult<()> {
        let _ = self.store.mark_cancelled(job_id).await;
        self.push.emit_cancelled(job_id).await;
        Err(CoreError::Cancelled)
    }

    async fn fail_and_maybe_retry(&self, job_id: &JobId, error: CoreError) -> CoreResult<()> {
        let message = error.to_string();
        let job = match self.store.mark_failure(job_id, message.clone(), None).await {
            Ok(job) => job,
            Err(e) => return Err(CoreError::from(e)),
        };
        self.push.emit_failed(job_id, message).await;

        if error.is_retryable() && job.can_retry() {
            let mut retried = job.clone();
            retried.prepare_retry();
            if self.store.update(&retried).await.is_ok() {
                if self.queue.offer_after_cooldown(job_id.clone(), retried.priority_class).await.is_err() {
                    let mut shutting_down = retried;
                    shutting_down.mark_failure(CoreError::ShuttingDown.to_string(), None);
                    let _ = self.store.update(&shutting_down).await;
                }
            }
        }

        Err(error)
    }

    async fn cleanup_working_dir(&self, job_id: &JobId) {
        let work_dir = self.config.work_dir.join(job_id.as_str());
        if let Err(e) = tokio::fs::remove_dir_all(&work_dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(job_id = %job_id, error = %e, "failed to remove working directory");
            }
        }
    }

    fn io_err(e: std::io::Error) -> CoreError {
        // There is no dedicated "initialization failed" kind; local disk
        // setup failures are lumped in with composition failures since
        // both are internal, retryable infrastructure problems rather than
        // anything about the script or a collaborator's response.
        CoreError::CompositionFailed(format!("i/o error: {e}"))
    }
}

fn orientation_for(ratio: AspectRatio) -> Orientation {
    let (w, h) = ratio.resolution();
    match w.cmp(&h) {
        std::cmp::Ordering::Greater => Orientation::Landscape,
        std::cmp::Ordering::Less => Orientation::Portrait,
        std::cmp::Ordering::Equal => Orientation::Square,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sf_collab::mock::{ScriptedAssetProvider, ScriptedCompositor, ScriptedProbe, ScriptedSegmenter, ScriptedSubtitleGenerator, ScriptedTts};
    use sf_models::{AspectRatio, TransitionKind};

    use super::*;

    #[test]
    fn orientation_matches_aspect_ratio() {
        assert_eq!(orientation_for(AspectRatio::Ratio16x9), Orientation::Landscape);
        assert_eq!(orientation_for(AspectRatio::Ratio9x16), Orientation::Portrait);
        assert_eq!(orientation_for(AspectRatio::Ratio1x1), Orientation::Square);
    }

    #[test]
    fn check_aborted_prefers_cancellation_over_timeout() {
        let cancel = cancelled_token();
        let past_deadline = Instant::now() - Duration::from_secs(1);
        assert!(matches!(PipelineDriver::check_aborted(&cancel, past_deadline), Some(CoreError::Cancelled)));
    }

    #[test]
    fn check_aborted_reports_timeout_when_not_cancelled() {
        let registry = crate::cancellation::CancellationRegistry::new();
        let token = tokio_test::block_on(registry.register(JobId::from_string("j1")));
        let past_deadline = Instant::now() - Duration::from_secs(1);
        assert!(matches!(PipelineDriver::check_aborted(&token, past_deadline), Some(CoreError::TimedOut)));
    }

    #[test]
    fn check_aborted_is_none_within_deadline() {
        let registry = crate::cancellation::CancellationRegistry::new();
        let token = tokio_test::block_on(registry.register(JobId::from_string("j1")));
        let future_deadline = Instant::now() + Duration::from_secs(60);
        assert!(PipelineDriver::check_aborted(&token, future_deadline).is_none());
    }

    fn cancelled_token() -> CancellationToken {
        let registry = crate::cancellation::CancellationRegistry::new();
        let job_id = JobId::from_string("j1");
        tokio_test::block_on(async {
            let token = registry.register(job_id.clone()).await;
            registry.cancel(&job_id).await;
            token
        })
    }

    #[tokio::test]
    async fn subtitle_stage_replaces_artifact_on_success() {
        let driver = test_driver(ScriptedSegmenter::two_scenes(), ScriptedTts::new(), ScriptedCompositor::new());
        let scenes = vec![Scene::new(0, "Hello world.", TransitionKind::Fade)];
        let dir = tempfile::tempdir().unwrap();
        let registry = crate::cancellation::CancellationRegistry::new();
        let token = registry.register(JobId::from_string("j1")).await;

        let result = driver
            .burn_subtitles_if_possible("/tmp/mock-artifact.mp4", dir.path(), &scenes, 6, &token, Instant::now() + Duration::from_secs(60))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn subtitle_stage_aborts_on_cancellation_between_scenes() {
        let driver = test_driver(ScriptedSegmenter::two_scenes(), ScriptedTts::new(), ScriptedCompositor::new());
        let scenes = vec![
            Scene::new(0, "Hello world.", TransitionKind::Fade),
            Scene::new(1, "Another scene.", TransitionKind::Fade),
        ];
        let dir = tempfile::tempdir().unwrap();
        let registry = crate::cancellation::CancellationRegistry::new();
        let job_id = JobId::from_string("j1");
        let token = registry.register(job_id.clone()).await;
        registry.cancel(&job_id).await;

        let result = driver
            .burn_subtitles_if_possible("/tmp/mock-artifact.mp4", dir.path(), &scenes, 6, &token, Instant::now() + Duration::from_secs(60))
            .await;

        assert!(matches!(result, Err(CoreError::Cancelled)));
    }

    fn test_driver(segmenter: ScriptedSegmenter, tts: ScriptedTts, compositor: ScriptedCompositor) -> PipelineDriver {
        PipelineDriver::new(
            test_store(),
            PriorityQueue::new(Duration::from_secs(60)),
            PushChannel::new(),
            Arc::new(segmenter),
            Arc::new(tts),
            Arc::new(ScriptedProbe::returning(2.0)),
            Arc::new(ScriptedAssetProvider::default()),
            Arc::new(compositor),
            Arc::new(ScriptedSubtitleGenerator),
            PipelineConfig::default(),
        )
    }

    fn test_store() -> JobStore {
        // Never actually connected to in these unit tests: only the pure
        // helpers and the subtitle-stage path, which never touch the store,
        // are exercised here. Full attempt round-trips live under
        // tests/integration, gated on a reachable Redis.
        JobStore::new(sf_store::StoreConfig::default()).expect("client construction does not connect")
    }
}
