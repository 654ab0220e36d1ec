//! Aspect ratio, resolution, and transition vocabulary shared by the
//! pipeline driver and the compositor collaborator contract.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One of the four aspect ratios a submission may request, plus two
/// additional ratios the compositor contract supports for completeness
/// of the resolution table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Ratio16x9,
    #[default]
    #[serde(rename = "9:16")]
    Ratio9x16,
    #[serde(rename = "1:1")]
    Ratio1x1,
    #[serde(rename = "4:5")]
    Ratio4x5,
    #[serde(rename = "4:3")]
    Ratio4x3,
    #[serde(rename = "21:9")]
    Ratio21x9,
}

impl AspectRatio {
    /// The four ratios a submission may request (§6). The remaining two
    /// entries in the resolution table exist for collaborators that accept
    /// a wider set but are not reachable from the Submission API.
    pub const SUBMITTABLE: &'static [AspectRatio] = &[
        AspectRatio::Ratio16x9,
        AspectRatio::Ratio9x16,
        AspectRatio::Ratio1x1,
        AspectRatio::Ratio4x5,
    ];

    /// Parse from the wire string form (e.g. "9:16").
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "16:9" => Some(AspectRatio::Ratio16x9),
            "9:16" => Some(AspectRatio::Ratio9x16),
            "1:1" => Some(AspectRatio::Ratio1x1),
            "4:5" => Some(AspectRatio::Ratio4x5),
            "4:3" => Some(AspectRatio::Ratio4x3),
            "21:9" => Some(AspectRatio::Ratio21x9),
            _ => None,
        }
    }

    /// The wire string form, e.g. "9:16".
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Ratio16x9 => "16:9",
            AspectRatio::Ratio9x16 => "9:16",
            AspectRatio::Ratio1x1 => "1:1",
            AspectRatio::Ratio4x5 => "4:5",
            AspectRatio::Ratio4x3 => "4:3",
            AspectRatio::Ratio21x9 => "21:9",
        }
    }

    /// Whether this ratio may be requested through the Submission API.
    pub fn is_submittable(&self) -> bool {
        Self::SUBMITTABLE.contains(self)
    }

    /// Target (width, height) in pixels, per the fixed table in §4.4.
    pub fn resolution(&self) -> (u32, u32) {
        match self {
            AspectRatio::Ratio16x9 => (1920, 1080),
            AspectRatio::Ratio9x16 => (1080, 1920),
            AspectRatio::Ratio1x1 => (1080, 1080),
            AspectRatio::Ratio4x5 => (1080, 1350),
            AspectRatio::Ratio4x3 => (1440, 1080),
            AspectRatio::Ratio21x9 => (2560, 1080),
        }
    }

    /// Resolution formatted as "WIDTHxHEIGHT".
    pub fn resolution_str(&self) -> String {
        let (w, h) = self.resolution();
        format!("{}x{}", w, h)
    }
}

/// Transition applied between two consecutive scenes in the composed video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    #[default]
    Fade,
    Cut,
    Dissolve,
    Slide,
    Wipe,
    Zoom,
}

impl TransitionKind {
    pub const ALL: &'static [TransitionKind] = &[
        TransitionKind::Fade,
        TransitionKind::Cut,
        TransitionKind::Dissolve,
        TransitionKind::Slide,
        TransitionKind::Wipe,
        TransitionKind::Zoom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::Fade => "fade",
            TransitionKind::Cut => "cut",
            TransitionKind::Dissolve => "dissolve",
            TransitionKind::Slide => "slide",
            TransitionKind::Wipe => "wipe",
            TransitionKind::Zoom => "zoom",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_table_matches_spec() {
        assert_eq!(AspectRatio::Ratio16x9.resolution(), (1920, 1080));
        assert_eq!(AspectRatio::Ratio9x16.resolution(), (1080, 1920));
        assert_eq!(AspectRatio::Ratio1x1.resolution(), (1080, 1080));
        assert_eq!(AspectRatio::Ratio4x5.resolution(), (1080, 1350));
        assert_eq!(AspectRatio::Ratio4x3.resolution(), (1440, 1080));
        assert_eq!(AspectRatio::Ratio21x9.resolution(), (2560, 1080));
    }

    #[test]
    fn resolution_str_formats_as_widthxheight() {
        assert_eq!(AspectRatio::Ratio9x16.resolution_str(), "1080x1920");
    }

    #[test]
    fn submittable_set_matches_spec() {
        assert!(AspectRatio::Ratio16x9.is_submittable());
        assert!(AspectRatio::Ratio9x16.is_submittable());
        assert!(AspectRatio::Ratio1x1.is_submittable());
        assert!(AspectRatio::Ratio4x5.is_submittable());
        assert!(!AspectRatio::Ratio4x3.is_submittable());
        assert!(!AspectRatio::Ratio21x9.is_submittable());
    }

    #[test]
    fn parse_round_trips_with_as_str() {
        for ratio in [
            AspectRatio::Ratio16x9,
            AspectRatio::Ratio9x16,
            AspectRatio::Ratio1x1,
            AspectRatio::Ratio4x5,
            AspectRatio::Ratio4x3,
            AspectRatio::Ratio21x9,
        ] {
            assert_eq!(AspectRatio::parse(ratio.as_str()), Some(ratio));
        }
        assert_eq!(AspectRatio::parse("3:2"), None);
    }
}
