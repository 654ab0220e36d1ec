//! Stock media descriptors: the pool the asset-provider collaborator
//! draws from when a scene has no narration-specific visual.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Video,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StockMediaDescriptor {
    pub id: String,
    pub title: String,
    pub media_type: MediaType,
    pub width: u32,
    pub height: u32,
    pub duration_secs: Option<f64>,
    pub tags: Vec<String>,
}

fn descriptor(
    id: &str,
    title: &str,
    media_type: MediaType,
    width: u32,
    height: u32,
    duration_secs: Option<f64>,
    tags: &[&str],
) -> StockMediaDescriptor {
    StockMediaDescriptor {
        id: id.to_string(),
        title: title.to_string(),
        media_type,
        width,
        height,
        duration_secs,
        tags: tags.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn all_stock_media() -> Vec<StockMediaDescriptor> {
    vec![
        descriptor(
            "stock-img-001",
            "City skyline at dusk",
            MediaType::Image,
            1920,
            1080,
            None,
            &["city", "skyline", "dusk"],
        ),
        descriptor(
            "stock-vid-001",
            "Ocean waves",
            MediaType::Video,
            1920,
            1080,
            Some(12.0),
            &["ocean", "nature", "calm"],
        ),
        descriptor(
            "stock-vid-002",
            "Busy office",
            MediaType::Video,
            1920,
            1080,
            Some(8.0),
            &["office", "work", "business"],
        ),
    ]
}

pub fn filter_stock_media(
    media_type: Option<MediaType>,
    search: Option<&str>,
    limit: usize,
) -> Vec<StockMediaDescriptor> {
    let search_lower = search.map(|s| s.to_lowercase());
    all_stock_media()
        .into_iter()
        .filter(|m| media_type.map_or(true, |t| m.media_type == t))
        .filter(|m| {
            search_lower.as_deref().map_or(true, |needle| {
                m.title.to_lowercase().contains(needle) || m.tags.iter().any(|t| t.contains(needle))
            })
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_by_media_type() {
        let results = filter_stock_media(Some(MediaType::Video), None, 50);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn filter_by_tag() {
        let results = filter_stock_media(None, Some("ocean"), 50);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "stock-vid-001");
    }
}
