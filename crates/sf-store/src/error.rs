//! Job store error types.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job store unreachable: {0}")]
    Unavailable(String),

    #[error("job not found")]
    NotFound,

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

impl From<StoreError> for sf_models::CoreError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => sf_models::CoreError::NotFound,
            other => sf_models::CoreError::StoreUnavailable(other.to_string()),
        }
    }
}
