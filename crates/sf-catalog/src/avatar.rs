//! Avatar catalog: optional on-screen presenter overlays.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AvatarGender {
    Male,
    Female,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Avatar {
    pub id: String,
    pub name: String,
    pub gender: AvatarGender,
    pub description: String,
    pub tags: Vec<String>,
}

fn avatar(id: &str, name: &str, gender: AvatarGender, description: &str, tags: &[&str]) -> Avatar {
    Avatar {
        id: id.to_string(),
        name: name.to_string(),
        gender,
        description: description.to_string(),
        tags: tags.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn all_avatars() -> Vec<Avatar> {
    vec![
        avatar(
            "avatar-maya",
            "Maya",
            AvatarGender::Female,
            "Friendly studio presenter",
            &["studio", "casual"],
        ),
        avatar(
            "avatar-leo",
            "Leo",
            AvatarGender::Male,
            "Professional news-style presenter",
            &["studio", "formal"],
        ),
    ]
}

pub fn filter_avatars(gender: Option<AvatarGender>, search: Option<&str>, limit: usize) -> Vec<Avatar> {
    let search_lower = search.map(|s| s.to_lowercase());
    all_avatars()
        .into_iter()
        .filter(|a| gender.map_or(true, |g| a.gender == g))
        .filter(|a| {
            search_lower.as_deref().map_or(true, |needle| {
                a.name.to_lowercase().contains(needle) || a.tags.iter().any(|t| t.contains(needle))
            })
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_by_gender() {
        let results = filter_avatars(Some(AvatarGender::Male), None, 50);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "avatar-leo");
    }

    #[test]
    fn filter_by_tag_search() {
        let results = filter_avatars(None, Some("formal"), 50);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "avatar-leo");
    }
}
