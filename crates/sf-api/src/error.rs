//! API error types.
//!
//! Everything here maps the closed [`CoreError`] taxonomy onto an HTTP
//! status, per the kinds named in §7. Kinds that only ever describe a
//! job's terminal outcome (narration/composition failure, timeout,
//! cancellation, invalid script) are not expected to surface from a
//! handler directly; they are still matched exhaustively so a future
//! addition to `CoreError` fails to compile here instead of falling
//! through to a generic 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use sf_models::CoreError;
use sf_queue::QueueError;
use sf_store::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("rate limited")]
    RateLimited,

    #[error("not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("not ready")]
    NotReady,

    #[error("gone")]
    Gone,

    #[error("shutting down")]
    ShuttingDown,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::NotReady => StatusCode::CONFLICT,
            ApiError::Gone => StatusCode::GONE,
            ApiError::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> Option<&'static str> {
        match self {
            ApiError::Validation(_) => Some("validation_error"),
            ApiError::RateLimited => Some("rate_limited"),
            ApiError::NotFound => Some("not_found"),
            ApiError::StoreUnavailable(_) => Some("store_unavailable"),
            ApiError::NotReady => Some("not_ready"),
            ApiError::Gone => Some("gone"),
            ApiError::ShuttingDown => Some("shutting_down"),
            ApiError::Conflict(_) => Some("conflict"),
            ApiError::Internal(_) => None,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::ValidationError(m) => ApiError::Validation(m),
            CoreError::RateLimited => ApiError::RateLimited,
            CoreError::NotFound => ApiError::NotFound,
            CoreError::StoreUnavailable(m) => ApiError::StoreUnavailable(m),
            CoreError::NotReady => ApiError::NotReady,
            CoreError::Gone => ApiError::Gone,
            CoreError::ShuttingDown => ApiError::ShuttingDown,
            CoreError::ScriptInvalid(m) => ApiError::Internal(m),
            CoreError::NarrationFailed(m) => ApiError::Internal(m),
            CoreError::CompositionFailed(m) => ApiError::Internal(m),
            CoreError::TimedOut => ApiError::Internal("attempt timed out".to_string()),
            CoreError::Cancelled => ApiError::Conflict("job already cancelled".to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        CoreError::from(e).into()
    }
}

impl From<QueueError> for ApiError {
    fn from(e: QueueError) -> Self {
        match e {
            QueueError::Closed => ApiError::ShuttingDown,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code().map(str::to_string);

        let detail = match &self {
            ApiError::Internal(_) | ApiError::StoreUnavailable(_) => {
                if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                    "an internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse { detail, code })).into_response()
    }
}
