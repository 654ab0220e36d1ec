//! Sentence-boundary [`Segmenter`].

use async_trait::async_trait;

use sf_models::{Scene, TransitionKind};

use crate::error::{CollabError, CollabResult};
use crate::traits::Segmenter;

/// Splits a script into one scene per sentence. Markdown headers (lines
/// starting with `#`) are dropped before splitting, since scripts carry
/// them for display but they are never meant to be narrated.
#[derive(Debug, Default, Clone, Copy)]
pub struct SentenceSegmenter;

impl SentenceSegmenter {
    pub fn new() -> Self {
        Self
    }

    fn strip_headers(content: &str) -> String {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn split_sentences(content: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut current = String::new();
        for ch in content.chars() {
            current.push(ch);
            if matches!(ch, '.' | '!' | '?') {
                let trimmed = current.trim().to_string();
                if !trimmed.is_empty() {
                    sentences.push(trimmed);
                }
                current.clear();
            }
        }
        let trailing = current.trim();
        if !trailing.is_empty() {
            sentences.push(trailing.to_string());
        }
        sentences
    }
}

#[async_trait]
impl Segmenter for SentenceSegmenter {
    async fn segment(&self, script_text: &str, _locale: &str) -> CollabResult<Vec<Scene>> {
        let cleaned = Self::strip_headers(script_text);
        if cleaned.is_empty() {
            return Err(CollabError::new("script content is empty after cleaning"));
        }

        let scenes: Vec<Scene> = Self::split_sentences(&cleaned)
            .into_iter()
            .enumerate()
            .map(|(i, text)| Scene::new(i as u32, text, TransitionKind::Fade))
            .collect();

        if scenes.is_empty() {
            return Err(CollabError::new("segmentation produced zero scenes"));
        }
        Ok(scenes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn splits_on_sentence_boundaries() {
        let segmenter = SentenceSegmenter::new();
        let scenes = segmenter
            .segment("Hello world. This is a test!", "en-US")
            .await
            .unwrap();
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0].text, "Hello world.");
        assert_eq!(scenes[1].text, "This is a test!");
    }

    #[tokio::test]
    async fn strips_markdown_headers() {
        let segmenter = SentenceSegmenter::new();
        let scenes = segmenter
            .segment("# Title\n## Section\nActual narration here.", "en-US")
            .await
            .unwrap();
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].text, "Actual narration here.");
    }

    #[tokio::test]
    async fn empty_script_is_rejected() {
        let segmenter = SentenceSegmenter::new();
        let result = segmenter.segment("# Title\n## Section", "en-US").await;
        assert!(result.is_err());
    }
}
