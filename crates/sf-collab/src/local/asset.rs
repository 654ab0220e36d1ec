//! Offline [`AssetProvider`]: generates a solid-color still image instead
//! of reaching out to a stock-media catalog. Real catalog search is an
//! explicit non-goal of the core; this keeps the pipeline runnable without
//! it and matches the driver's own policy of never failing a job over a
//! missing visual.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use crate::local::ffmpeg::run_ffmpeg;
use crate::traits::{AssetProvider, Orientation};

#[derive(Debug, Clone)]
pub struct PlaceholderAssetProvider {
    output_dir: PathBuf,
}

impl PlaceholderAssetProvider {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn resolution_for(orientation: Orientation) -> (u32, u32) {
        match orientation {
            Orientation::Portrait => (1080, 1920),
            Orientation::Landscape => (1920, 1080),
            Orientation::Square => (1080, 1080),
        }
    }

    /// Derives a stable, visually distinct color per scene so placeholder
    /// scenes are at least distinguishable from one another.
    fn color_for(scene_text: &str) -> &'static str {
        const PALETTE: &[&str] = &["0x2B2D42", "0x8D99AE", "0xEF233C", "0xD90429", "0x3A5A40"];
        let idx = scene_text.bytes().map(|b| b as usize).sum::<usize>() % PALETTE.len();
        PALETTE[idx]
    }

    async fn render(&self, scene_text: &str, orientation: Orientation) -> crate::error::CollabResult<String> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let (w, h) = Self::resolution_for(orientation);
        let path = self.output_dir.join(format!("{}.jpg", Uuid::new_v4()));

        run_ffmpeg(&[
            "-y".to_string(),
            "-f".to_string(),
            "lavfi".to_string(),
            "-i".to_string(),
            format!("color=c={}:s={}x{}:d=1", Self::color_for(scene_text), w, h),
            "-frames:v".to_string(),
            "1".to_string(),
            path.to_string_lossy().to_string(),
        ])
        .await?;

        Ok(path.to_string_lossy().to_string())
    }
}

#[async_trait]
impl AssetProvider for PlaceholderAssetProvider {
    async fn acquire(&self, scene_text: &str, orientation: Orientation) -> String {
        match self.render(scene_text, orientation).await {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "placeholder asset render failed, falling back to fixed path");
                self.output_dir
                    .join("fallback.jpg")
                    .to_string_lossy()
                    .to_string()
            }
        }
    }
}
