//! ffprobe-backed [`MediaProbe`].

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{CollabError, CollabResult};
use crate::local::ffmpeg::run_ffprobe;
use crate::traits::MediaProbe;

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

/// Probes media files by shelling out to `ffprobe`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfprobeMediaProbe;

impl FfprobeMediaProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaProbe for FfprobeMediaProbe {
    async fn duration_secs(&self, file_path: &str) -> CollabResult<f64> {
        let stdout = run_ffprobe(&[
            "-v".to_string(),
            "quiet".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_format".to_string(),
            file_path.to_string(),
        ])
        .await?;

        let parsed: FfprobeOutput = serde_json::from_str(&stdout)
            .map_err(|e| CollabError::new(format!("could not parse ffprobe output: {e}")))?;

        parsed
            .format
            .duration
            .and_then(|d| d.parse::<f64>().ok())
            .ok_or_else(|| CollabError::new("ffprobe reported no duration"))
    }
}
