//! Sliding-window rate limiter keyed by client address

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of requests allowed inside one window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_seconds: u64,
}

impl RateLimiterConfig {
    /// General API budget: 100 requests per hour
    pub fn general() -> Self {
        Self {
            max_requests: 100,
            window_seconds: 3600,
        }
    }

    /// Authentication budget: 3 attempts per 15 minutes
    pub fn auth() -> Self {
        Self {
            max_requests: 3,
            window_seconds: 900,
        }
    }

    fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    /// Rejected; the oldest request in the window leaves it after this long
    Limited { retry_after: Duration },
}

/// Rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Rate limiter configuration
    config: RateLimiterConfig,
    /// Timestamps of accepted requests per key
    entries: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record a request for `key` if the window still has room
    pub async fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> Decision {
        let window = self.config.window();
        let mut entries = self.entries.lock().await;
        let log = entries.entry(key.to_string()).or_default();

        while log
            .front()
            .is_some_and(|oldest| now.duration_since(*oldest) >= window)
        {
            log.pop_front();
        }

        if log.len() >= self.config.max_requests as usize {
            let retry_after = log
                .front()
                .map(|oldest| window.saturating_sub(now.duration_since(*oldest)))
                .unwrap_or(window);
            warn!("Rate limit exceeded for key {}", key);
            return Decision::Limited { retry_after };
        }

        log.push_back(now);
        Decision::Allowed
    }

    /// Drop keys whose whole log has aged out of the window
    pub async fn purge_stale(&self) {
        let window = self.config.window();
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, log| {
            log.back()
                .is_some_and(|newest| now.duration_since(*newest) < window)
        });
        debug!("Purged {} idle rate limit keys", before - entries.len());
    }
}
