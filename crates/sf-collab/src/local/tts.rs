//! Offline [`TextToSpeech`] implementation.
//!
//! Real narration requires a provider credential (Azure, Google, ...),
//! which is outside the core's concern — it only consumes the adapter
//! interface. This implementation synthesizes silence of a length derived
//! from the text's word count via `ffmpeg`'s `anullsrc` filter, so the
//! pipeline can run end to end without any external TTS credential.

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use sf_models::estimate_duration_secs;

use crate::error::CollabResult;
use crate::local::ffmpeg::run_ffmpeg;
use crate::traits::TextToSpeech;

#[derive(Debug, Clone)]
pub struct SilentNarrator {
    output_dir: PathBuf,
}

impl SilentNarrator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl TextToSpeech for SilentNarrator {
    async fn synthesize(&self, text: &str, _locale: &str, _voice: &str) -> CollabResult<String> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let duration = estimate_duration_secs(text);
        let path = self.output_dir.join(format!("{}.mp3", Uuid::new_v4()));

        run_ffmpeg(&[
            "-y".to_string(),
            "-f".to_string(),
            "lavfi".to_string(),
            "-i".to_string(),
            "anullsrc=r=24000:cl=mono".to_string(),
            "-t".to_string(),
            format!("{duration:.3}"),
            "-q:a".to_string(),
            "9".to_string(),
            path.to_string_lossy().to_string(),
        ])
        .await?;

        Ok(path.to_string_lossy().to_string())
    }
}
