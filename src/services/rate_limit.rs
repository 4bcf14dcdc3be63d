//! Per-client token-bucket admission control.
//!
//! One bucket per client key (source address), created lazily at full
//! capacity on first sight. Refill is greedy: permits accrue continuously
//! with elapsed time instead of arriving in whole-window bursts. Buckets
//! are kept for the life of the process; a client that rotates keys gets a
//! fresh budget each time, and clients behind shared NAT share one.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

pub struct RateLimiter {
    buckets: Mutex<HashMap<String, Bucket>>,
    capacity: f64,
    // tokens per second
    refill_rate: f64,
}

impl RateLimiter {
    /// `capacity` permits, replenished at `capacity` per `window`.
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            capacity: f64::from(capacity),
            refill_rate: f64::from(capacity) / window.as_secs_f64(),
        }
    }

    /// Take one permit for `key` if the budget allows it.
    ///
    /// Check-and-decrement happens under the map lock, so concurrent
    /// callers sharing a key can never overdraw the bucket. A rejected
    /// call leaves the budget untouched.
    pub fn try_consume(&self, key: &str) -> bool {
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        let bucket = buckets.entry(key.to_string()).or_insert(Bucket {
            tokens: self.capacity,
            last_refill: now,
        });

        let elapsed = now.saturating_duration_since(bucket.last_refill);
        bucket.tokens = (bucket.tokens + elapsed.as_secs_f64() * self.refill_rate)
            .min(self.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    #[allow(dead_code)]
    pub fn tracked_keys(&self) -> usize {
        self.buckets.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn fresh_key_gets_exactly_capacity() {
        let limiter = RateLimiter::new(10, Duration::from_secs(60));

        for _ in 0..10 {
            assert!(limiter.try_consume("10.0.0.1"));
        }
        assert!(!limiter.try_consume("10.0.0.1"));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));

        assert!(limiter.try_consume("10.0.0.1"));
        assert!(limiter.try_consume("10.0.0.1"));
        assert!(!limiter.try_consume("10.0.0.1"));

        assert!(limiter.try_consume("10.0.0.2"));
        assert!(limiter.try_consume("10.0.0.2"));
        assert!(!limiter.try_consume("10.0.0.2"));
    }

    #[test]
    fn refill_is_greedy_not_burst() {
        // 10 per second => one permit roughly every 100ms
        let limiter = RateLimiter::new(10, Duration::from_secs(1));

        for _ in 0..10 {
            assert!(limiter.try_consume("k"));
        }
        assert!(!limiter.try_consume("k"));

        // Less than a full window is enough for a partial refill.
        thread::sleep(Duration::from_millis(350));
        assert!(limiter.try_consume("k"));
    }

    #[test]
    fn idle_bucket_caps_at_capacity() {
        let limiter = RateLimiter::new(3, Duration::from_millis(100));

        // Touch the bucket, then let several full windows pass; the budget
        // must top out at capacity, not accumulate one per window.
        assert!(limiter.try_consume("k"));
        thread::sleep(Duration::from_millis(450));
        assert!(limiter.try_consume("k"));
        assert!(limiter.try_consume("k"));
        assert!(limiter.try_consume("k"));
        assert!(!limiter.try_consume("k"));
    }

    #[test]
    fn full_window_restores_full_capacity() {
        let limiter = RateLimiter::new(3, Duration::from_millis(200));

        for _ in 0..3 {
            assert!(limiter.try_consume("k"));
        }
        assert!(!limiter.try_consume("k"));

        thread::sleep(Duration::from_millis(250));
        for _ in 0..3 {
            assert!(limiter.try_consume("k"));
        }
        assert!(!limiter.try_consume("k"));
    }

    #[test]
    fn concurrent_consumers_never_overdraw() {
        // Window long enough that no refill lands during the test.
        let limiter = Arc::new(RateLimiter::new(10, Duration::from_secs(600)));

        let handles: Vec<_> = (0..40)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                thread::spawn(move || limiter.try_consume("203.0.113.7"))
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&ok| ok)
            .count();
        assert_eq!(admitted, 10);
    }
}
