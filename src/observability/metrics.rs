//! Process-wide request counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CounterSnapshot {
    /// Requests that passed the rate limiter
    pub total_requests: u64,

    /// Handler faults turned into 500 responses
    pub total_errors: u64,

    /// Requests rejected by the rate limiter
    pub rate_limited: u64,

    /// Mean handler latency over `total_requests`
    pub avg_response_time_ms: f64,
}

impl CounterSnapshot {
    /// Share of counted requests that did not fault, in percent
    pub fn availability_percent(&self) -> f64 {
        if self.total_requests == 0 {
            return 100.0;
        }
        let ok = self.total_requests.saturating_sub(self.total_errors);
        ok as f64 * 100.0 / self.total_requests as f64
    }
}

/// Lock-free request counters shared by every request.
///
/// `total_requests` only ever grows, and each field is a single atomic, so a
/// reader can never observe a partially applied increment.
#[derive(Debug, Default)]
pub struct RequestCounters {
    total_requests: AtomicU64,
    total_errors: AtomicU64,
    rate_limited: AtomicU64,
    total_response_time_us: AtomicU64,
}

impl RequestCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an incoming request and return its id (the new total)
    pub fn record_request(&self) -> u64 {
        self.total_requests.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Count a handler fault and return the running error count
    pub fn record_error(&self) -> u64 {
        self.total_errors.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Count a rate limit rejection
    pub fn record_rate_limited(&self) -> u64 {
        self.rate_limited.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Add the handler latency of one request, kept in microseconds
    pub fn record_latency(&self, elapsed: Duration) {
        self.total_response_time_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::SeqCst)
    }

    pub fn total_errors(&self) -> u64 {
        self.total_errors.load(Ordering::SeqCst)
    }

    /// Get current counter values
    pub fn snapshot(&self) -> CounterSnapshot {
        let total_requests = self.total_requests();
        let total_errors = self.total_errors();
        let rate_limited = self.rate_limited.load(Ordering::Relaxed);
        let total_response_time_us = self.total_response_time_us.load(Ordering::Relaxed);

        let avg_response_time_ms = if total_requests > 0 {
            total_response_time_us as f64 / 1000.0 / total_requests as f64
        } else {
            0.0
        };

        CounterSnapshot {
            total_requests,
            total_errors,
            rate_limited,
            avg_response_time_ms,
        }
    }
}
