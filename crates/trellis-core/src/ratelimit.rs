//! Sliding-window rate limit decisions.
//!
//! [`RateLimitPolicy`] contains the counting logic only: no transport, no
//! clock, no framework types. Callers supply the current [`Instant`],
//! which keeps the policy deterministic under test and lets the guards
//! share one implementation for both steady-state rate limiting and
//! short-window burst detection.

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    start: Instant,
}

/// Sliding-window counter keyed by an opaque client key.
#[derive(Debug)]
pub struct RateLimitPolicy {
    limit: u32,
    window: Duration,
    entries: HashMap<String, WindowEntry>,
}

impl RateLimitPolicy {
    /// Creates a policy allowing `limit` requests per `window`.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            entries: HashMap::new(),
        }
    }

    /// The configured request limit per window.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// The configured window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Decides whether a request identified by `key` is allowed at `now`.
    ///
    /// The first request in a window always passes. A window older than
    /// the configured length resets the counter.
    pub fn allow(&mut self, key: &str, now: Instant) -> bool {
        self.prune(now);

        let entry = self.entries.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            start: now,
        });

        if now.duration_since(entry.start) > self.window {
            entry.count = 0;
            entry.start = now;
        }

        if entry.count >= self.limit {
            return false;
        }

        entry.count += 1;
        true
    }

    /// Drops entries whose window expired, bounding memory per client set.
    fn prune(&mut self, now: Instant) {
        let window = self.window;
        self.entries
            .retain(|_, entry| now.duration_since(entry.start) <= window);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(limit: u32, window_secs: u64) -> RateLimitPolicy {
        RateLimitPolicy::new(limit, Duration::from_secs(window_secs))
    }

    #[test]
    fn test_first_request_always_passes() {
        let mut policy = policy(1, 60);
        assert!(policy.allow("client-a", Instant::now()));
    }

    #[test]
    fn test_limit_is_enforced_within_window() {
        let mut policy = policy(3, 60);
        let now = Instant::now();

        for _ in 0..3 {
            assert!(policy.allow("client-a", now));
        }
        assert!(!policy.allow("client-a", now));
    }

    #[test]
    fn test_keys_are_counted_independently() {
        let mut policy = policy(1, 60);
        let now = Instant::now();

        assert!(policy.allow("client-a", now));
        assert!(!policy.allow("client-a", now));
        assert!(policy.allow("client-b", now));
    }

    #[test]
    fn test_window_expiry_resets_counter() {
        let mut policy = policy(2, 5);
        let start = Instant::now();

        assert!(policy.allow("client-a", start));
        assert!(policy.allow("client-a", start));
        assert!(!policy.allow("client-a", start));

        let later = start + Duration::from_secs(6);
        assert!(policy.allow("client-a", later));
    }

    #[test]
    fn test_expired_entries_are_pruned() {
        let mut policy = policy(1, 5);
        let start = Instant::now();

        policy.allow("client-a", start);
        policy.allow("client-b", start);
        assert_eq!(policy.entries.len(), 2);

        policy.allow("client-c", start + Duration::from_secs(10));
        assert_eq!(policy.entries.len(), 1);
    }
}
