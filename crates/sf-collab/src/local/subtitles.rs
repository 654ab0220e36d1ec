//! Even-split word-timing [`SubtitleGenerator`].
//!
//! Lacking a forced-aligner collaborator, word timings are estimated by
//! spreading the scene's words evenly across its measured audio duration,
//! then grouping them into lines of at most `words_per_line` words. This
//! is an approximation, not true alignment, but it keeps segment bounds
//! inside the audio's duration and monotonically increasing, which is all
//! the driver's timing invariant requires.

use async_trait::async_trait;

use sf_models::SubtitleSegment;

use crate::error::{CollabError, CollabResult};
use crate::local::ffmpeg::run_ffprobe;
use crate::traits::SubtitleGenerator;

#[derive(Debug, Default, Clone, Copy)]
pub struct EvenSplitSubtitleGenerator;

impl EvenSplitSubtitleGenerator {
    pub fn new() -> Self {
        Self
    }

    async fn audio_duration(audio_path: &str) -> CollabResult<f64> {
        let stdout = run_ffprobe(&[
            "-v".to_string(),
            "quiet".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_format".to_string(),
            audio_path.to_string(),
        ])
        .await?;

        serde_json::from_str::<serde_json::Value>(&stdout)
            .ok()
            .and_then(|v| v["format"]["duration"].as_str().and_then(|s| s.parse::<f64>().ok()))
            .ok_or_else(|| CollabError::new("could not determine audio duration"))
    }
}

#[async_trait]
impl SubtitleGenerator for EvenSplitSubtitleGenerator {
    async fn generate(&self, audio_path: &str, text: &str, words_per_line: u8) -> CollabResult<Vec<SubtitleSegment>> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let duration = Self::audio_duration(audio_path).await?;
        let per_word = duration / words.len() as f64;
        let words_per_line = words_per_line.max(1) as usize;

        let mut segments = Vec::new();
        for (line_idx, chunk) in words.chunks(words_per_line).enumerate() {
            let start_secs = line_idx as f64 * words_per_line as f64 * per_word;
            let end_secs = (start_secs + chunk.len() as f64 * per_word).min(duration);
            segments.push(SubtitleSegment {
                text: chunk.join(" "),
                start_secs,
                end_secs,
            });
        }
        Ok(segments)
    }
}

/// Render subtitle segments as SRT text, independent of any collaborator.
pub fn export_to_srt(segments: &[SubtitleSegment]) -> String {
    use sf_models::timestamp::format_srt_timestamp;

    segments
        .iter()
        .enumerate()
        .map(|(i, seg)| {
            format!(
                "{}\n{} --> {}\n{}\n",
                i + 1,
                format_srt_timestamp(seg.start_secs),
                format_srt_timestamp(seg.end_secs),
                seg.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srt_export_numbers_segments_sequentially() {
        let segments = vec![
            SubtitleSegment { text: "hi".into(), start_secs: 0.0, end_secs: 1.0 },
            SubtitleSegment { text: "there".into(), start_secs: 1.0, end_secs: 2.0 },
        ];
        let srt = export_to_srt(&segments);
        assert!(srt.starts_with('1'));
        assert!(srt.contains("2\n00:00:01,000 --> 00:00:02,000\nthere"));
    }
}
