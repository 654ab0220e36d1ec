//! Per-user rolling-window admission limiter.
//!
//! Unlike a token bucket, a rolling window keeps the actual timestamps of
//! recent admissions and counts how many fall inside the trailing window.
//! This matches the source's in-memory limiter exactly and is simple to
//! reason about for a once-an-hour-ish cap.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::warn;

/// Default admissions allowed per window.
pub const DEFAULT_MAX_PER_WINDOW: usize = 10;
/// Default window length.
pub const DEFAULT_WINDOW_SECS: u64 = 3600;

/// Caps the number of distinct users tracked to bound memory under a
/// burst of one-off callers.
const MAX_TRACKED_USERS: usize = 50_000;

/// Rolling-window admission limiter, keyed by user id.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<RwLock<HashMap<String, VecDeque<Instant>>>>,
    max_per_window: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_per_window: usize, window: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            max_per_window,
            window,
        }
    }

    pub fn from_env() -> Self {
        let max_per_window = std::env::var("RATE_LIMIT_MAX_PER_HOUR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_PER_WINDOW);
        let window_secs = std::env::var("RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_WINDOW_SECS);
        Self::new(max_per_window, Duration::from_secs(window_secs))
    }

    /// Check whether `user_id` may be admitted right now. If so, records
    /// the admission. Returns `false` without side effects if the user is
    /// currently at or over the cap.
    pub async fn check_and_record(&self, user_id: &str) -> bool {
        let now = Instant::now();
        let mut guard = self.inner.write().await;

        if guard.len() >= MAX_TRACKED_USERS && !guard.contains_key(user_id) {
            self.evict_stale(&mut guard, now);
            if guard.len() >= MAX_TRACKED_USERS {
                warn!(tracked_users = guard.len(), "rate limiter tracking at capacity");
            }
        }

        let window = self.window;
        let entry = guard.entry(user_id.to_string()).or_default();
        while let Some(&front) = entry.front() {
            if now.duration_since(front) > window {
                entry.pop_front();
            } else {
                break;
            }
        }

        if entry.len() >= self.max_per_window {
            return false;
        }
        entry.push_back(now);
        true
    }

    /// Number of admissions still available for `user_id` in the current
    /// window, without recording anything.
    pub async fn remaining(&self, user_id: &str) -> usize {
        let now = Instant::now();
        let guard = self.inner.read().await;
        let used = guard
            .get(user_id)
            .map(|entries| entries.iter().filter(|&&t| now.duration_since(t) <= self.window).count())
            .unwrap_or(0);
        self.max_per_window.saturating_sub(used)
    }

    fn evict_stale(&self, guard: &mut HashMap<String, VecDeque<Instant>>, now: Instant) {
        guard.retain(|_, entries| {
            entries.retain(|&t| now.duration_since(t) <= self.window);
            !entries.is_empty()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn admits_up_to_the_cap() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        assert!(limiter.check_and_record("u1").await);
        assert!(limiter.check_and_record("u1").await);
        assert!(limiter.check_and_record("u1").await);
        assert!(!limiter.check_and_record("u1").await);
    }

    #[tokio::test]
    async fn tracks_users_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check_and_record("u1").await);
        assert!(limiter.check_and_record("u2").await);
        assert!(!limiter.check_and_record("u1").await);
    }

    #[tokio::test]
    async fn remaining_reflects_usage_without_recording() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        assert_eq!(limiter.remaining("u1").await, 2);
        limiter.check_and_record("u1").await;
        assert_eq!(limiter.remaining("u1").await, 1);
        assert_eq!(limiter.remaining("u1").await, 1);
    }

    #[tokio::test]
    async fn window_expiry_frees_capacity() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20));
        assert!(limiter.check_and_record("u1").await);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(limiter.check_and_record("u1").await);
    }
}
