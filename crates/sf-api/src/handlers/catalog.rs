//! Read-only catalog browsing: platforms, voices, avatars, stock media.

use axum::extract::{Path, Query};
use axum::Json;
use serde::Deserialize;

use sf_catalog::{
    all_platforms, filter_avatars, filter_stock_media, filter_voices, get_platform, get_voice, Avatar,
    AvatarGender, MediaType, PlatformPreset, StockMediaDescriptor, Voice, VoiceGender, VoiceStyle,
};

use crate::error::{ApiError, ApiResult};

const DEFAULT_LIMIT: usize = 50;

pub async fn list_platforms() -> Json<Vec<PlatformPreset>> {
    Json(all_platforms())
}

pub async fn get_platform_handler(Path(id): Path<String>) -> ApiResult<Json<PlatformPreset>> {
    get_platform(&id).map(Json).ok_or(ApiError::NotFound)
}

#[derive(Debug, Deserialize)]
pub struct VoiceQuery {
    pub language_code: Option<String>,
    pub gender: Option<VoiceGender>,
    pub style: Option<VoiceStyle>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list_voices(Query(query): Query<VoiceQuery>) -> Json<Vec<Voice>> {
    Json(filter_voices(
        query.language_code.as_deref(),
        query.gender,
        query.style,
        query.search.as_deref(),
        query.limit.unwrap_or(DEFAULT_LIMIT),
    ))
}

pub async fn get_voice_handler(Path(id): Path<String>) -> ApiResult<Json<Voice>> {
    get_voice(&id).map(Json).ok_or(ApiError::NotFound)
}

#[derive(Debug, Deserialize)]
pub struct AvatarQuery {
    pub gender: Option<AvatarGender>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list_avatars(Query(query): Query<AvatarQuery>) -> Json<Vec<Avatar>> {
    Json(filter_avatars(query.gender, query.search.as_deref(), query.limit.unwrap_or(DEFAULT_LIMIT)))
}

#[derive(Debug, Deserialize)]
pub struct StockMediaQuery {
    pub media_type: Option<MediaType>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list_stock_media(Query(query): Query<StockMediaQuery>) -> Json<Vec<StockMediaDescriptor>> {
    Json(filter_stock_media(
        query.media_type,
        query.search.as_deref(),
        query.limit.unwrap_or(DEFAULT_LIMIT),
    ))
}
