//! # Rolling-window rate limiter
//! Tracks AI-call budget over a sliding window (default 60s).
//!
//! Every AI-backed operation consults this before issuing a backend call.
//! A slot is consumed only when permission is granted, i.e. when the call
//! is actually about to be issued; rejected attempts do not count.

use std::{
    collections::VecDeque,
    sync::Mutex,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::Serialize;
use thiserror::Error;

/// Returned when the window is full. Carries the wait until a slot frees up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rate limit reached, retry after {retry_after_secs}s")]
pub struct RateLimitExceeded {
    pub retry_after_secs: u64,
}

/// Point-in-time view of the window, for the status surface.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitSnapshot {
    pub requests_in_window: u32,
    pub max_requests_per_window: u32,
    pub can_make_request: bool,
    pub seconds_until_next_available: u64,
}

/// Thread-safe rolling time window over issued-call timestamps.
#[derive(Debug)]
pub struct RateLimiter {
    inner: Mutex<Inner>,
    window: Duration,
    max_requests: u32,
}

#[derive(Debug)]
struct Inner {
    /// Unix seconds of each issued call, oldest first.
    issued: VecDeque<u64>,
}

impl RateLimiter {
    /// Create a limiter with the given budget over the given window.
    pub fn with_window(max_requests: u32, window: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                issued: VecDeque::new(),
            }),
            window,
            max_requests,
        }
    }

    /// Convenience constructor for the standard 60-second window.
    pub fn per_minute(max_requests: u32) -> Self {
        Self::with_window(max_requests, Duration::from_secs(60))
    }

    /// Try to reserve a slot for one backend call at the current time.
    pub fn try_acquire(&self) -> Result<(), RateLimitExceeded> {
        self.try_acquire_at(now_unix())
    }

    /// Same as [`try_acquire`](Self::try_acquire) with an explicit clock,
    /// so window behavior is testable without sleeping.
    pub fn try_acquire_at(&self, now: u64) -> Result<(), RateLimitExceeded> {
        let mut inner = self.inner.lock().expect("rate limiter mutex poisoned");
        Self::prune(&mut inner.issued, now, self.window.as_secs());

        if inner.issued.len() as u32 >= self.max_requests {
            let retry_after = inner
                .issued
                .front()
                .map(|&oldest| (oldest + self.window.as_secs()).saturating_sub(now))
                .unwrap_or(0)
                .min(self.window.as_secs());
            return Err(RateLimitExceeded {
                retry_after_secs: retry_after,
            });
        }

        inner.issued.push_back(now);
        Ok(())
    }

    pub fn snapshot(&self) -> RateLimitSnapshot {
        self.snapshot_at(now_unix())
    }

    pub fn snapshot_at(&self, now: u64) -> RateLimitSnapshot {
        let mut inner = self.inner.lock().expect("rate limiter mutex poisoned");
        Self::prune(&mut inner.issued, now, self.window.as_secs());

        let used = inner.issued.len() as u32;
        let can_make_request = used < self.max_requests;
        let seconds_until_next_available = if can_make_request {
            0
        } else {
            inner
                .issued
                .front()
                .map(|&oldest| (oldest + self.window.as_secs()).saturating_sub(now))
                .unwrap_or(0)
                .min(self.window.as_secs())
        };

        RateLimitSnapshot {
            requests_in_window: used,
            max_requests_per_window: self.max_requests,
            can_make_request,
            seconds_until_next_available,
        }
    }

    /// Length of the window in seconds (useful for diagnostics).
    pub fn window_secs(&self) -> u64 {
        self.window.as_secs()
    }

    fn prune(issued: &mut VecDeque<u64>, now: u64, window_secs: u64) {
        let cutoff = now.saturating_sub(window_secs);
        while let Some(&t) = issued.front() {
            if t <= cutoff {
                issued.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Current UNIX time in seconds.
fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs()
}
