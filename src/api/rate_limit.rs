use std::time::{Duration, Instant};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use crate::config::rate_limit::RateLimitConfig;
use crate::observability::metrics::RATE_LIMIT_REJECTIONS;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Admit,
    Reject { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, RateLimitDecision::Admit)
    }
}

#[derive(Clone, Copy, Debug)]
struct WindowEntry {
    window_start: Instant,
    count: u32,
}

impl WindowEntry {
    fn fresh(now: Instant) -> Self {
        WindowEntry {
            window_start: now,
            count: 1,
        }
    }
}

/// Fixed-window limiter keyed by caller identity.
///
/// Each check holds the key's map entry for the whole read-modify-write, so
/// concurrent requests for the same key cannot lose an increment. Different
/// keys only contend when they share a shard.
///
/// Counts reset at window boundaries, so a burst straddling a boundary can
/// admit up to twice the limit.
pub struct FixedWindowRateLimiter {
    windows: DashMap<String, WindowEntry>,
    max_requests: u32,
    window: Duration,
}

impl FixedWindowRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        FixedWindowRateLimiter {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, config.window())
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        match self.windows.entry(key.to_string()) {
            Entry::Vacant(vacant) => {
                vacant.insert(WindowEntry::fresh(now));
                RateLimitDecision::Admit
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();

                // Reset if window expired
                if now.saturating_duration_since(entry.window_start) >= self.window {
                    *entry = WindowEntry::fresh(now);
                    return RateLimitDecision::Admit;
                }

                entry.count = entry.count.saturating_add(1);
                if entry.count <= self.max_requests {
                    return RateLimitDecision::Admit;
                }

                RATE_LIMIT_REJECTIONS.inc();
                tracing::warn!(
                    limit = self.max_requests,
                    window_secs = self.window.as_secs(),
                    "Rate limit exceeded"
                );
                RateLimitDecision::Reject {
                    retry_after: self.window,
                }
            }
        }
    }

    /// Drops entries whose window has elapsed. Returns how many were removed.
    pub fn evict_expired(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, entry| now.saturating_duration_since(entry.window_start) < self.window);
        before.saturating_sub(self.windows.len())
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}
