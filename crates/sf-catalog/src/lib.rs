//! Read-only catalogs backing the platform/voice/avatar/stock-media
//! pickers.
//!
//! All catalogs here are in-process seed data, not a database; they
//! exist so the Catalog Service's filters have something concrete to
//! filter.

pub mod avatar;
pub mod platform;
pub mod stock_media;
pub mod voice;

pub use avatar::{all_avatars, filter_avatars, Avatar, AvatarGender};
pub use platform::{all_platforms, get_platform, PlatformPreset};
pub use stock_media::{all_stock_media, filter_stock_media, MediaType, StockMediaDescriptor};
pub use voice::{all_voices, filter_voices, get_voice, Voice, VoiceGender, VoiceStyle};
