//! Voice catalog: the set of TTS voice selectors a script can be narrated
//! with.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VoiceGender {
    Male,
    Female,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VoiceStyle {
    Conversational,
    Narration,
    Cheerful,
    Serious,
    Calm,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub language: String,
    pub language_code: String,
    pub gender: VoiceGender,
    pub style: VoiceStyle,
    pub description: String,
}

fn voice(
    id: &str,
    name: &str,
    language: &str,
    language_code: &str,
    gender: VoiceGender,
    style: VoiceStyle,
    description: &str,
) -> Voice {
    Voice {
        id: id.to_string(),
        name: name.to_string(),
        language: language.to_string(),
        language_code: language_code.to_string(),
        gender,
        style,
        description: description.to_string(),
    }
}

/// The fixed set of known voices.
pub fn all_voices() -> Vec<Voice> {
    vec![
        voice(
            "en-US-JennyNeural",
            "Jenny (US English)",
            "English (US)",
            "en-US",
            VoiceGender::Female,
            VoiceStyle::Conversational,
            "Clear American English voice",
        ),
        voice(
            "en-US-GuyNeural",
            "Guy (US English)",
            "English (US)",
            "en-US",
            VoiceGender::Male,
            VoiceStyle::Narration,
            "Professional American English voice",
        ),
        voice(
            "en-GB-SoniaNeural",
            "Sonia (UK English)",
            "English (UK)",
            "en-GB",
            VoiceGender::Female,
            VoiceStyle::Serious,
            "British English voice",
        ),
        voice(
            "ja-JP-NanamiNeural",
            "Nanami (Japanese)",
            "Japanese",
            "ja-JP",
            VoiceGender::Female,
            VoiceStyle::Calm,
            "Natural Japanese voice",
        ),
        voice(
            "hi-IN-SwaraNeural",
            "Swara (Hindi)",
            "Hindi",
            "hi-IN",
            VoiceGender::Female,
            VoiceStyle::Cheerful,
            "Hindi voice",
        ),
    ]
}

/// Case-insensitive conjunctive filter over the voice catalog. Any `None`
/// criterion matches everything.
pub fn filter_voices(
    language_code: Option<&str>,
    gender: Option<VoiceGender>,
    style: Option<VoiceStyle>,
    search: Option<&str>,
    limit: usize,
) -> Vec<Voice> {
    let search_lower = search.map(|s| s.to_lowercase());
    all_voices()
        .into_iter()
        .filter(|v| language_code.map_or(true, |lc| v.language_code.eq_ignore_ascii_case(lc)))
        .filter(|v| gender.map_or(true, |g| v.gender == g))
        .filter(|v| style.map_or(true, |s| v.style == s))
        .filter(|v| {
            search_lower.as_deref().map_or(true, |needle| {
                v.name.to_lowercase().contains(needle) || v.language.to_lowercase().contains(needle)
            })
        })
        .take(limit)
        .collect()
}

pub fn get_voice(id: &str) -> Option<Voice> {
    all_voices().into_iter().find(|v| v.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_by_language_code() {
        let results = filter_voices(Some("ja-JP"), None, None, None, 50);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "ja-JP-NanamiNeural");
    }

    #[test]
    fn filter_by_gender_and_style_is_conjunctive() {
        let results = filter_voices(None, Some(VoiceGender::Female), Some(VoiceStyle::Calm), None, 50);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "ja-JP-NanamiNeural");
    }

    #[test]
    fn search_is_case_insensitive() {
        let results = filter_voices(None, None, None, Some("JENNY"), 50);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn limit_caps_results() {
        let results = filter_voices(None, None, None, None, 2);
        assert_eq!(results.len(), 2);
    }
}
