//! Reconnect backoff for the vehicle link.
//!
//! Doubles the wait after every failed attempt up to a ceiling and adds a
//! little jitter so a flapping link does not produce a tight retry loop.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
    failures: u32,
    jitter_ratio: f64,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        let base = base.max(Duration::from_millis(1));
        Self {
            base,
            max: max.max(base),
            current: base,
            failures: 0,
            jitter_ratio: 0.2,
        }
    }

    /// Consecutive failures since the last reset.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Register a failed attempt and return how long to wait before the next one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = if self.failures == 0 {
            self.base
        } else {
            self.current.saturating_mul(2).min(self.max)
        };
        self.current = delay;
        self.failures = self.failures.saturating_add(1);
        with_jitter(delay, self.jitter_ratio)
    }

    pub fn reset(&mut self) {
        self.current = self.base;
        self.failures = 0;
    }
}

fn with_jitter(delay: Duration, ratio: f64) -> Duration {
    let spread_ms = (delay.as_millis() as f64 * ratio) as u64;
    if spread_ms == 0 {
        return delay;
    }
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::from(d.subsec_nanos()))
        .unwrap_or(0);
    delay + Duration::from_millis(seed % (spread_ms + 1))
}
