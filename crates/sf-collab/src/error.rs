//! Error type returned by collaborator adapters.
//!
//! Collaborator errors carry only a message. Mapping a failure to the
//! right core error kind (`ScriptInvalid`, `NarrationFailed`,
//! `CompositionFailed`, ...) is the pipeline driver's job, since the same
//! underlying adapter failure means something different depending on
//! which stage invoked it.

use thiserror::Error;

pub type CollabResult<T> = Result<T, CollabError>;

#[derive(Debug, Error, Clone)]
#[error("{0}")]
pub struct CollabError(String);

impl CollabError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<std::io::Error> for CollabError {
    fn from(e: std::io::Error) -> Self {
        Self(e.to_string())
    }
}
