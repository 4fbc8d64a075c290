//! # Per-caller Rate Limiting
//!
//! Rolling-window request log per caller key. A caller may make at most
//! `max_requests` requests in any `window`-long interval.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Rate limit configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per window (default: 10)
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,

    /// Window length in seconds (default: 60)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Key callers by the first `X-Forwarded-For` entry instead of the peer
    /// address. Only enable behind a proxy that overwrites the header.
    #[serde(default)]
    pub trust_forwarded_for: bool,

    /// Upper bound on distinct callers held in memory (default: 10000)
    #[serde(default = "default_max_tracked_callers")]
    pub max_tracked_callers: usize,
}

fn default_max_requests() -> usize {
    10
}

fn default_window_secs() -> u64 {
    60
}

fn default_max_tracked_callers() -> usize {
    10_000
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            trust_forwarded_for: false,
            max_tracked_callers: default_max_tracked_callers(),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Rejection returned when a caller is over the limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    /// Whole seconds until the oldest request leaves the window (at least 1)
    pub retry_after_secs: u64,
}

/// Minimum spacing between two sweeps of a full caller table
const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
struct CallerTable {
    logs: HashMap<String, VecDeque<Instant>>,
    next_sweep: Option<Instant>,
}

impl CallerTable {
    /// Drop callers whose whole log has expired, at most once per
    /// `SWEEP_INTERVAL`.
    fn sweep(&mut self, now: Instant, window: Duration) {
        if self.next_sweep.is_some_and(|next| now < next) {
            return;
        }
        self.logs.retain(|_, log| {
            log.back()
                .is_some_and(|&newest| now.saturating_duration_since(newest) < window)
        });
        self.next_sweep = Some(now + SWEEP_INTERVAL.min(window));
    }
}

/// In-memory rolling-window rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    max_tracked_callers: usize,
    trust_forwarded_for: bool,
    table: Mutex<CallerTable>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: config.window(),
            max_tracked_callers: config.max_tracked_callers.max(1),
            trust_forwarded_for: config.trust_forwarded_for,
            table: Mutex::new(CallerTable::default()),
        }
    }

    /// Whether caller keys may come from `X-Forwarded-For`
    pub fn trusts_forwarded_for(&self) -> bool {
        self.trust_forwarded_for
    }

    /// Record a request from `key` at `now`, or reject it.
    ///
    /// A caller not yet tracked is rejected while the table is full of
    /// callers that are still inside their window.
    pub fn check(&self, key: &str, now: Instant) -> Result<(), RateLimited> {
        let mut table = self
            .table
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if !table.logs.contains_key(key) && table.logs.len() >= self.max_tracked_callers {
            table.sweep(now, self.window);
            if table.logs.len() >= self.max_tracked_callers {
                return Err(RateLimited {
                    retry_after_secs: SWEEP_INTERVAL.min(self.window).as_secs().max(1),
                });
            }
        }

        let log = table.logs.entry(key.to_string()).or_default();
        while let Some(&oldest) = log.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                log.pop_front();
            } else {
                break;
            }
        }

        if log.len() >= self.max_requests {
            let retry_after = log
                .front()
                .map(|&oldest| self.window.saturating_sub(now.saturating_duration_since(oldest)))
                .unwrap_or(self.window);
            return Err(RateLimited {
                retry_after_secs: retry_after.as_secs_f64().ceil().max(1.0) as u64,
            });
        }

        log.push_back(now);
        Ok(())
    }

    /// Number of callers currently tracked
    pub fn tracked_callers(&self) -> usize {
        self.table
            .lock()
            .map(|table| table.logs.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: usize, window_secs: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            max_requests,
            window_secs,
            ..Default::default()
        })
    }

    #[test]
    fn test_defaults() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_requests, 10);
        assert_eq!(config.window(), Duration::from_secs(60));
    }

    #[test]
    fn test_eleventh_request_in_window_is_rejected() {
        let limiter = limiter(10, 60);
        let start = Instant::now();
        for i in 0..10 {
            assert!(limiter.check("1.2.3.4", start + Duration::from_secs(i)).is_ok());
        }
        let rejected = limiter
            .check("1.2.3.4", start + Duration::from_secs(10))
            .unwrap_err();
        assert_eq!(rejected.retry_after_secs, 50);
    }

    #[test]
    fn test_window_rolls() {
        let limiter = limiter(2, 60);
        let start = Instant::now();
        assert!(limiter.check("a", start).is_ok());
        assert!(limiter.check("a", start + Duration::from_secs(30)).is_ok());
        assert!(limiter.check("a", start + Duration::from_secs(59)).is_err());
        // First request has left the window
        assert!(limiter.check("a", start + Duration::from_secs(60)).is_ok());
        assert!(limiter.check("a", start + Duration::from_secs(61)).is_err());
    }

    #[test]
    fn test_callers_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();
        assert!(limiter.check("a", now).is_ok());
        assert!(limiter.check("a", now).is_err());
        assert!(limiter.check("b", now).is_ok());
        assert_eq!(limiter.tracked_callers(), 2);
    }

    #[test]
    fn test_rejection_does_not_extend_window() {
        let limiter = limiter(1, 10);
        let start = Instant::now();
        assert!(limiter.check("a", start).is_ok());
        for i in 1..10 {
            assert!(limiter.check("a", start + Duration::from_secs(i)).is_err());
        }
        assert!(limiter.check("a", start + Duration::from_secs(10)).is_ok());
    }

    fn capped(max_tracked_callers: usize, window_secs: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            max_requests: 5,
            window_secs,
            max_tracked_callers,
            ..Default::default()
        })
    }

    #[test]
    fn test_sweep_drops_idle_callers() {
        let limiter = capped(64, 1);
        let start = Instant::now();
        for i in 0..64 {
            assert!(limiter.check(&format!("caller-{}", i), start).is_ok());
        }
        assert_eq!(limiter.tracked_callers(), 64);
        assert!(limiter.check("late", start + Duration::from_secs(5)).is_ok());
        assert_eq!(limiter.tracked_callers(), 1);
    }

    #[test]
    fn test_full_table_rejects_new_callers() {
        let limiter = capped(3, 60);
        let now = Instant::now();
        for key in ["a", "b", "c"] {
            assert!(limiter.check(key, now).is_ok());
        }

        let rejected = limiter.check("d", now).unwrap_err();
        assert_eq!(rejected.retry_after_secs, 1);
        assert_eq!(limiter.tracked_callers(), 3);

        // Known callers keep their own budget.
        assert!(limiter.check("a", now).is_ok());
    }

    #[test]
    fn test_rotating_keys_stay_bounded() {
        let limiter = capped(100, 60);
        let now = Instant::now();
        let accepted = (0..5000)
            .filter(|i| limiter.check(&format!("10.0.{}.{}", i / 256, i % 256), now).is_ok())
            .count();
        assert_eq!(accepted, 100);
        assert_eq!(limiter.tracked_callers(), 100);
    }

    #[test]
    fn test_forwarded_for_untrusted_by_default() {
        assert!(!RateLimiter::new(&RateLimitConfig::default()).trusts_forwarded_for());
        let config: RateLimitConfig = serde_json::from_str(r#"{"trust_forwarded_for": true}"#).unwrap();
        assert!(RateLimiter::new(&config).trusts_forwarded_for());
        assert_eq!(config.max_tracked_callers, 10_000);
    }
}
