//! The worker pool: pulls jobs off the priority queue, runs each through
//! the pipeline driver under a bounded concurrency limit and a hard
//! timeout, tracks liveness via heartbeats, and recovers jobs whose
//! attempt went stale.

pub mod config;
pub mod executor;
pub mod heartbeat;
pub mod stale;

pub use config::WorkerConfig;
pub use executor::WorkerPool;
pub use heartbeat::HeartbeatRegistry;
pub use stale::StaleJobDetector;
