//! Collaborator contracts toward the four external services the pipeline
//! driver depends on for actual signal work: sentence segmentation,
//! text-to-speech, stock-asset search, and media composition/probing/
//! subtitles. The driver is written against these traits only; it never
//! knows whether it is talking to a real provider, an offline local
//! implementation, or a scripted test double.

pub mod error;
pub mod local;
pub mod mock;
pub mod traits;

pub use error::{CollabError, CollabResult};
pub use traits::{
    AssetProvider, CompositionSegment, Compositor, MediaProbe, Orientation, Segmenter,
    SubtitleGenerator, TextToSpeech,
};
