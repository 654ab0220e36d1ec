//! The pipeline driver: runs one job attempt through its eight stages
//! against the collaborator traits in `sf-collab`, persisting state via
//! `sf-store`, re-offering retries via `sf-queue`, and fanning progress
//! out via `sf-push`.

pub mod cancellation;
pub mod config;
pub mod driver;

pub use cancellation::{CancellationRegistry, CancellationToken};
pub use config::PipelineConfig;
pub use driver::{AttemptObserver, PipelineDriver};
