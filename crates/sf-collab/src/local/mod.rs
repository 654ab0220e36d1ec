//! Offline, ffmpeg-backed collaborator implementations. No network
//! credentials required; suitable for running the pipeline driver end to
//! end in an environment with no real TTS/catalog/compositor providers
//! configured.

mod asset;
mod compositor;
mod ffmpeg;
mod probe;
mod segmenter;
mod subtitles;
mod tts;

pub use asset::PlaceholderAssetProvider;
pub use compositor::FfmpegCompositor;
pub use probe::FfprobeMediaProbe;
pub use segmenter::SentenceSegmenter;
pub use subtitles::{export_to_srt, EvenSplitSubtitleGenerator};
pub use tts::SilentNarrator;
