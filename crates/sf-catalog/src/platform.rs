//! Platform presets: fixed, seeded descriptors of the delivery targets a
//! job can be produced for.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use sf_models::AspectRatio;

/// A single platform's delivery constraints, used by the API to validate
/// submissions and by clients to render a picker.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlatformPreset {
    pub id: String,
    pub name: String,
    pub description: String,
    pub aspect_ratio: AspectRatio,
    pub max_duration_secs: Option<u32>,
    pub optimal_duration_secs: u32,
    pub resolution: String,
    pub features: Vec<String>,
}

fn preset(
    id: &str,
    name: &str,
    description: &str,
    aspect_ratio: AspectRatio,
    max_duration_secs: Option<u32>,
    optimal_duration_secs: u32,
    resolution: &str,
    features: &[&str],
) -> PlatformPreset {
    PlatformPreset {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        aspect_ratio,
        max_duration_secs,
        optimal_duration_secs,
        resolution: resolution.to_string(),
        features: features.iter().map(|s| s.to_string()).collect(),
    }
}

/// The fixed set of known platform presets.
pub fn all_platforms() -> Vec<PlatformPreset> {
    vec![
        preset(
            "tiktok",
            "TikTok",
            "Short-form viral videos",
            AspectRatio::Ratio9x16,
            Some(180),
            30,
            "1080x1920",
            &["trending_sounds", "effects", "duets"],
        ),
        preset(
            "youtube",
            "YouTube",
            "Long-form content",
            AspectRatio::Ratio16x9,
            None,
            600,
            "1920x1080",
            &["chapters", "end_screens", "cards"],
        ),
        preset(
            "youtube_shorts",
            "YouTube Shorts",
            "Short vertical videos",
            AspectRatio::Ratio9x16,
            Some(60),
            30,
            "1080x1920",
            &["shorts_shelf", "quick_creation"],
        ),
        preset(
            "instagram_reels",
            "Instagram Reels",
            "Short entertaining videos",
            AspectRatio::Ratio9x16,
            Some(90),
            30,
            "1080x1920",
            &["music", "effects", "explore"],
        ),
        preset(
            "instagram_stories",
            "Instagram Stories",
            "24-hour temporary content",
            AspectRatio::Ratio9x16,
            Some(15),
            15,
            "1080x1920",
            &["stickers", "polls", "questions"],
        ),
        preset(
            "facebook",
            "Facebook",
            "Social media videos",
            AspectRatio::Ratio16x9,
            None,
            120,
            "1920x1080",
            &["live", "watch", "stories"],
        ),
    ]
}

/// Look up one platform preset by id.
pub fn get_platform(id: &str) -> Option<PlatformPreset> {
    all_platforms().into_iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_six_platforms_present() {
        let ids: Vec<_> = all_platforms().into_iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), 6);
        assert!(ids.contains(&"tiktok".to_string()));
        assert!(ids.contains(&"youtube_shorts".to_string()));
    }

    #[test]
    fn unknown_platform_is_none() {
        assert!(get_platform("myspace").is_none());
    }

    #[test]
    fn youtube_has_no_max_duration() {
        let yt = get_platform("youtube").unwrap();
        assert!(yt.max_duration_secs.is_none());
    }
}
