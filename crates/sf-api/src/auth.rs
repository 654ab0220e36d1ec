//! User identification.
//!
//! There is no JWT/auth provider in this stack (explicitly out of scope);
//! callers identify themselves with an opaque header. Missing it is a
//! validation error, not a 401 — there is no such kind in the closed
//! error taxonomy.

use axum::http::HeaderMap;

use crate::error::{ApiError, ApiResult};

pub const USER_ID_HEADER: &str = "X-User-Id";

pub fn require_user_id(headers: &HeaderMap) -> ApiResult<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::validation("missing X-User-Id header"))
}
