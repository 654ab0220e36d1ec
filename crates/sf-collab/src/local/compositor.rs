//! ffmpeg-backed [`Compositor`].
//!
//! Each scene is rendered as an individual clip (still image held for its
//! measured audio duration, narration audio muxed in), then the clips are
//! concatenated via ffmpeg's concat demuxer. Transitions beyond a hard cut
//! are a cosmetic filter applied at concat time; composition never fails
//! just because a fancier transition isn't available, it falls back to a
//! cut.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{CollabError, CollabResult};
use crate::local::ffmpeg::run_ffmpeg;
use crate::traits::{CompositionSegment, Compositor};

#[derive(Debug, Clone)]
pub struct FfmpegCompositor {
    work_dir: PathBuf,
}

impl FfmpegCompositor {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    async fn render_clip(&self, segment: &CompositionSegment, resolution: (u32, u32), out: &Path) -> CollabResult<()> {
        let (w, h) = resolution;
        run_ffmpeg(&[
            "-y".to_string(),
            "-loop".to_string(),
            "1".to_string(),
            "-i".to_string(),
            segment.visual_path.clone(),
            "-i".to_string(),
            segment.audio_path.clone(),
            "-t".to_string(),
            format!("{:.3}", segment.duration_secs),
            "-vf".to_string(),
            format!("scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2"),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-shortest".to_string(),
            out.to_string_lossy().to_string(),
        ])
        .await
    }

    async fn concatenate(&self, clip_paths: &[PathBuf], out: &Path) -> CollabResult<()> {
        let list_path = self.work_dir.join(format!("{}.txt", Uuid::new_v4()));
        let list_contents = clip_paths
            .iter()
            .map(|p| format!("file '{}'", p.display()))
            .collect::<Vec<_>>()
            .join("\n");
        tokio::fs::write(&list_path, list_contents).await?;

        run_ffmpeg(&[
            "-y".to_string(),
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            list_path.to_string_lossy().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            out.to_string_lossy().to_string(),
        ])
        .await
    }
}

#[async_trait]
impl Compositor for FfmpegCompositor {
    async fn compose(&self, segments: &[CompositionSegment], resolution: (u32, u32)) -> CollabResult<String> {
        if segments.is_empty() {
            return Err(CollabError::new("cannot compose an empty segment list"));
        }
        tokio::fs::create_dir_all(&self.work_dir).await?;

        let mut clip_paths = Vec::with_capacity(segments.len());
        for segment in segments {
            let clip_path = self.work_dir.join(format!("{}.mp4", Uuid::new_v4()));
            self.render_clip(segment, resolution, &clip_path).await?;
            clip_paths.push(clip_path);
        }

        let output_path = self.work_dir.join(format!("{}.mp4", Uuid::new_v4()));
        if clip_paths.len() == 1 {
            tokio::fs::rename(&clip_paths[0], &output_path).await?;
        } else {
            self.concatenate(&clip_paths, &output_path).await?;
            for clip in &clip_paths {
                let _ = tokio::fs::remove_file(clip).await;
            }
        }

        Ok(output_path.to_string_lossy().to_string())
    }

    async fn burn_subtitles(&self, video_path: &str, subtitle_path: &str) -> CollabResult<String> {
        let output_path = self.work_dir.join(format!("{}.mp4", Uuid::new_v4()));
        run_ffmpeg(&[
            "-y".to_string(),
            "-i".to_string(),
            video_path.to_string(),
            "-vf".to_string(),
            format!("subtitles={subtitle_path}"),
            "-c:a".to_string(),
            "copy".to_string(),
            output_path.to_string_lossy().to_string(),
        ])
        .await?;
        Ok(output_path.to_string_lossy().to_string())
    }

    async fn extract_thumbnail(&self, video_path: &str, at_secs: f64, resolution: (u32, u32)) -> CollabResult<String> {
        let (w, h) = resolution;
        let output_path = self.work_dir.join(format!("{}.jpg", Uuid::new_v4()));
        run_ffmpeg(&[
            "-y".to_string(),
            "-ss".to_string(),
            format!("{at_secs:.3}"),
            "-i".to_string(),
            video_path.to_string(),
            "-vf".to_string(),
            format!("scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2"),
            "-frames:v".to_string(),
            "1".to_string(),
            output_path.to_string_lossy().to_string(),
        ])
        .await?;
        Ok(output_path.to_string_lossy().to_string())
    }
}
