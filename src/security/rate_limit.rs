//! Sliding-window rate limiting.
//!
//! One bucket per client identifier, holding the timestamps of previously
//! admitted requests within the trailing window. The whole map sits behind a
//! single mutex so admission decisions for an identifier are linearizable:
//! two concurrent requests can never both take the last remaining slot.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;
use crate::error::ProxyError;
use crate::observability::metrics;

/// How many admissions between idle-bucket sweeps.
const SWEEP_INTERVAL: u64 = 1024;

struct Buckets {
    map: HashMap<String, VecDeque<Instant>>,
    admissions: u64,
}

/// Per-identifier sliding-window rate limiter.
pub struct RateLimiter {
    buckets: Mutex<Buckets>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            buckets: Mutex::new(Buckets {
                map: HashMap::new(),
                admissions: 0,
            }),
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_seconds),
        }
    }

    /// Admit or reject a request for `identifier`.
    ///
    /// Rejections record nothing: the (max+1)-th request within the window
    /// does not extend the window for later requests.
    pub fn check(&self, identifier: &str) -> Result<(), ProxyError> {
        self.check_at(identifier, Instant::now())
    }

    fn check_at(&self, identifier: &str, now: Instant) -> Result<(), ProxyError> {
        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");

        let bucket = buckets
            .map
            .entry(identifier.to_string())
            .or_insert_with(VecDeque::new);

        // Lazy eviction: drop admissions that have aged out of the window.
        while let Some(&front) = bucket.front() {
            if now.duration_since(front) > self.window {
                bucket.pop_front();
            } else {
                break;
            }
        }

        if bucket.len() >= self.max_requests {
            tracing::warn!(client = %identifier, "Rate limit exceeded");
            metrics::record_rate_limited();
            return Err(ProxyError::Policy {
                code: "rate_limited",
                status: 429,
                message: "Too many requests. Please retry later.".to_string(),
            });
        }

        bucket.push_back(now);
        buckets.admissions += 1;

        if buckets.admissions % SWEEP_INTERVAL == 0 {
            Self::sweep(&mut buckets.map, now, self.window);
        }

        Ok(())
    }

    /// Drop buckets whose newest admission has aged out of the window.
    ///
    /// Bounds memory held for identifiers that stopped sending; buckets with
    /// any live timestamp are untouched.
    fn sweep(map: &mut HashMap<String, VecDeque<Instant>>, now: Instant, window: Duration) {
        let before = map.len();
        map.retain(|_, bucket| {
            bucket
                .back()
                .is_some_and(|&newest| now.duration_since(newest) <= window)
        });
        let dropped = before - map.len();
        if dropped > 0 {
            tracing::debug!(dropped, tracked = map.len(), "Swept idle rate-limit buckets");
        }
    }

    /// Number of identifiers currently tracked.
    pub fn tracked_identifiers(&self) -> usize {
        self.buckets.lock().expect("rate limiter mutex poisoned").map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: usize, window_seconds: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            max_requests,
            window_seconds,
        })
    }

    #[test]
    fn test_admits_up_to_limit_then_rejects() {
        let limiter = limiter(3, 60);
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.check_at("client-a", now).is_ok());
        }
        let err = limiter.check_at("client-a", now).unwrap_err();
        match err {
            ProxyError::Policy { code, status, .. } => {
                assert_eq!(code, "rate_limited");
                assert_eq!(status, 429);
            }
            other => panic!("expected Policy rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_identifiers_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        assert!(limiter.check_at("client-a", now).is_ok());
        assert!(limiter.check_at("client-b", now).is_ok());
        assert!(limiter.check_at("client-a", now).is_err());
    }

    #[test]
    fn test_sliding_window_expiry() {
        let limiter = limiter(2, 10);
        let start = Instant::now();

        assert!(limiter.check_at("client-a", start).is_ok());
        assert!(limiter.check_at("client-a", start).is_ok());
        assert!(limiter.check_at("client-a", start).is_err());

        // Past the window, both admissions have aged out.
        let later = start + Duration::from_secs(11);
        assert!(limiter.check_at("client-a", later).is_ok());
    }

    #[test]
    fn test_rejection_does_not_record() {
        let limiter = limiter(1, 10);
        let start = Instant::now();

        assert!(limiter.check_at("client-a", start).is_ok());

        // Hammer the limiter mid-window; none of these may extend the window.
        for i in 1..=5 {
            let t = start + Duration::from_secs(i);
            assert!(limiter.check_at("client-a", t).is_err());
        }

        // The single admission at `start` expires on schedule regardless of
        // the rejected attempts after it.
        let later = start + Duration::from_secs(11);
        assert!(limiter.check_at("client-a", later).is_ok());
    }

    #[test]
    fn test_sweep_drops_idle_buckets() {
        let limiter = limiter(10, 1);
        let start = Instant::now();

        for i in 0..SWEEP_INTERVAL - 1 {
            let id = format!("client-{}", i);
            assert!(limiter.check_at(&id, start).is_ok());
        }
        assert_eq!(limiter.tracked_identifiers() as u64, SWEEP_INTERVAL - 1);

        // The admission that crosses SWEEP_INTERVAL runs a sweep; everything
        // admitted at `start` is idle by then.
        let later = start + Duration::from_secs(5);
        assert!(limiter.check_at("fresh-client", later).is_ok());
        assert_eq!(limiter.tracked_identifiers(), 1);
    }
}
