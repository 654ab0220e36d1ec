//! In-process priority queue for ready-to-run jobs.
//!
//! Ordering is by coarse priority class, then Offer-time sequence number
//! so ties within a class always resolve in Offer order. A failed job
//! eligible for retry is parked in a cooldown holding area rather than
//! re-offered immediately; see `run_retry_cooldown_timer`.

pub mod entry;
pub mod error;
pub mod queue;

pub use entry::QueueEntry;
pub use error::{QueueError, QueueResult};
pub use queue::{PriorityQueue, Taken, DEFAULT_RETRY_COOLDOWN_SECS};
