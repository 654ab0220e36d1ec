//! Subtitle policy and transient per-attempt subtitle segments.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Subtitle rendering style requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubtitleStyle {
    #[default]
    Standard,
    Karaoke,
    WordHighlight,
}

/// Subtitle generation policy, part of the immutable job request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubtitlePolicy {
    /// Whether subtitles are generated and burned in at all.
    pub enabled: bool,
    /// Rendering style.
    pub style: SubtitleStyle,
    /// Maximum words grouped onto one subtitle line, in [1, 10].
    pub words_per_line: u8,
}

impl SubtitlePolicy {
    /// Whether `words_per_line` is within the allowed [1, 10] range.
    pub fn is_valid(&self) -> bool {
        (1..=10).contains(&self.words_per_line)
    }
}

impl Default for SubtitlePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            style: SubtitleStyle::Standard,
            words_per_line: 6,
        }
    }
}

/// One timed subtitle segment, relative to the final video's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleSegment {
    /// Text content of this segment.
    pub text: String,
    /// Start time in seconds from the final video's start.
    pub start_secs: f64,
    /// End time in seconds from the final video's start.
    pub end_secs: f64,
}

impl SubtitleSegment {
    /// Re-offset this segment by a cumulative duration, used when folding
    /// per-scene subtitle segments onto the final video's shared timeline.
    pub fn offset(&self, by_secs: f64) -> Self {
        Self {
            text: self.text.clone(),
            start_secs: self.start_secs + by_secs,
            end_secs: self.end_secs + by_secs,
        }
    }
}

/// Verify a list of segments is monotonically non-decreasing and
/// non-overlapping, as required by the data model invariant.
pub fn segments_are_well_ordered(segments: &[SubtitleSegment]) -> bool {
    segments.windows(2).all(|pair| {
        let [a, b] = pair else { return true };
        a.end_secs <= b.start_secs + f64::EPSILON
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_per_line_validation() {
        let mut policy = SubtitlePolicy::default();
        policy.words_per_line = 0;
        assert!(!policy.is_valid());
        policy.words_per_line = 11;
        assert!(!policy.is_valid());
        policy.words_per_line = 5;
        assert!(policy.is_valid());
    }

    #[test]
    fn offset_shifts_both_bounds() {
        let seg = SubtitleSegment {
            text: "hi".to_string(),
            start_secs: 1.0,
            end_secs: 2.0,
        };
        let shifted = seg.offset(10.0);
        assert_eq!(shifted.start_secs, 11.0);
        assert_eq!(shifted.end_secs, 12.0);
    }

    #[test]
    fn well_ordered_detects_overlap() {
        let ok = vec![
            SubtitleSegment { text: "a".into(), start_secs: 0.0, end_secs: 1.0 },
            SubtitleSegment { text: "b".into(), start_secs: 1.0, end_secs: 2.0 },
        ];
        assert!(segments_are_well_ordered(&ok));

        let bad = vec![
            SubtitleSegment { text: "a".into(), start_secs: 0.0, end_secs: 1.5 },
            SubtitleSegment { text: "b".into(), start_secs: 1.0, end_secs: 2.0 },
        ];
        assert!(!segments_are_well_ordered(&bad));
    }
}
