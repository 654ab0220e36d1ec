//! Artifact and thumbnail delivery.
//!
//! No range-request support: jobs produce short-form clips, not content
//! worth seeking into over a slow connection.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use sf_models::{JobId, JobState};

use crate::auth::require_user_id;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

async fn serve_file(path: &str, content_type: &str, disposition: Option<String>) -> ApiResult<Response> {
    let bytes = tokio::fs::read(path).await.map_err(|_| ApiError::Gone)?;

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, bytes.len())
        .header("Cross-Origin-Resource-Policy", "same-origin");

    if let Some(value) = disposition {
        builder = builder.header(header::CONTENT_DISPOSITION, value);
    }

    builder.body(Body::from(bytes)).map_err(|e| ApiError::internal(e.to_string()))
}

pub async fn get_artifact(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let user_id = require_user_id(&headers)?;
    let job = state.store.get(&JobId::from_string(job_id.clone())).await?;
    if job.user_id != user_id {
        return Err(ApiError::NotFound);
    }
    if job.state != JobState::Success {
        return Err(ApiError::NotReady);
    }
    let result = job.result.ok_or(ApiError::NotReady)?;
    serve_file(
        &result.artifact_path,
        "video/mp4",
        Some(format!("inline; filename=\"{job_id}.mp4\"")),
    )
    .await
}

pub async fn get_thumbnail(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let user_id = require_user_id(&headers)?;
    let job = state.store.get(&JobId::from_string(job_id)).await?;
    if job.user_id != user_id {
        return Err(ApiError::NotFound);
    }
    if job.state != JobState::Success {
        return Err(ApiError::NotReady);
    }
    let result = job.result.ok_or(ApiError::NotReady)?;
    serve_file(&result.thumbnail_path, "image/jpeg", None).await
}
