//! Windowed rate limiting
//!
//! A fixed-window counter keyed by caller identity (client IP at the
//! HTTP edge). Injected into the server state as an explicit
//! collaborator so a multi-instance deployment can swap in a
//! distributed limiter without touching the pipeline.

use std::time::{Duration, Instant};

use dashmap::DashMap;

struct Bucket {
    window_start: Instant,
    count: u32,
}

/// Fixed-window request counter
pub struct RateLimiter {
    max_per_window: u32,
    window: Duration,
    buckets: DashMap<String, Bucket>,
}

impl RateLimiter {
    pub fn new(max_per_window: u32, window: Duration) -> Self {
        Self {
            max_per_window,
            window,
            buckets: DashMap::new(),
        }
    }

    /// Count one request for `key`. Returns false when the caller has
    /// exhausted the current window.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut bucket = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| Bucket {
                window_start: now,
                count: 0,
            });

        if now.duration_since(bucket.window_start) >= self.window {
            bucket.window_start = now;
            bucket.count = 0;
        }

        if bucket.count >= self.max_per_window {
            return false;
        }

        bucket.count += 1;
        true
    }

    /// Drop buckets idle for more than two windows. Called periodically
    /// from a background task.
    pub fn prune(&self) {
        let cutoff = self.window * 2;
        self.buckets
            .retain(|_, bucket| bucket.window_start.elapsed() < cutoff);
    }

    /// Number of tracked callers (for diagnostics)
    pub fn tracked_callers(&self) -> usize {
        self.buckets.len()
    }
}
