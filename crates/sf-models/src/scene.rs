//! Transient per-attempt scene state. Scenes are never persisted; they
//! live only inside one pipeline attempt.

use crate::aspect_ratio::TransitionKind;

/// Words-per-minute constant used to derive a scene's preliminary duration
/// estimate before narration. The estimate is advisory only: the Narrate
/// stage always overwrites it with the measured audio duration (§4.4).
pub const WORDS_PER_MINUTE: f64 = 120.0;

/// One contiguous narration unit, with its own audio and visual.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Zero-based position within the script.
    pub index: u32,
    /// Narration text for this scene.
    pub text: String,
    /// Assigned duration in seconds. Starts as a word-count estimate and
    /// is overwritten with the measured audio duration during Narrate.
    pub duration_secs: f64,
    /// Local path to the assigned visual asset, once acquired.
    pub visual_path: Option<String>,
    /// Local path to the assigned narration audio, once synthesized.
    pub audio_path: Option<String>,
    /// Transition leading into this scene from the previous one.
    pub transition: TransitionKind,
}

impl Scene {
    /// Create a scene with a word-count-derived preliminary duration.
    pub fn new(index: u32, text: impl Into<String>, transition: TransitionKind) -> Self {
        let text = text.into();
        let duration_secs = estimate_duration_secs(&text);
        Self {
            index,
            text,
            duration_secs,
            visual_path: None,
            audio_path: None,
            transition,
        }
    }

    /// Overwrite the duration with a measured value from the probe
    /// collaborator. This is the central timing invariant of the pipeline:
    /// everything downstream must read `duration_secs` after this call.
    pub fn set_measured_duration(&mut self, measured_secs: f64) {
        self.duration_secs = measured_secs;
    }
}

/// Estimate a scene's spoken duration from its word count, using
/// [`WORDS_PER_MINUTE`]. Floors at 1 second so an empty or near-empty
/// scene never yields a zero or negative preliminary duration.
pub fn estimate_duration_secs(text: &str) -> f64 {
    let word_count = text.split_whitespace().count().max(1) as f64;
    (word_count / WORDS_PER_MINUTE * 60.0).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_scales_with_word_count() {
        let short = estimate_duration_secs("one two three");
        let long = estimate_duration_secs(&"word ".repeat(120));
        assert!(long > short);
        // 120 words at 120 wpm should be about 60 seconds.
        assert!((long - 60.0).abs() < 1.0);
    }

    #[test]
    fn estimate_floors_at_one_second() {
        assert_eq!(estimate_duration_secs(""), 1.0);
    }

    #[test]
    fn measured_duration_overwrites_estimate() {
        let mut scene = Scene::new(0, "hello world", TransitionKind::Fade);
        let estimate = scene.duration_secs;
        scene.set_measured_duration(4.25);
        assert_ne!(scene.duration_secs, estimate);
        assert_eq!(scene.duration_secs, 4.25);
    }
}
