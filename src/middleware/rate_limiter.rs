//! Fixed-window rate limiting keyed by client address

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::api::AppState;
use crate::config::RateLimitSettings;
use crate::shutdown::ShutdownNotifier;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,
    /// Time window duration
    pub window_duration: Duration,
    /// Whether to enable rate limiting
    pub enabled: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_duration: Duration::from_secs(15 * 60),
            enabled: true,
        }
    }
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            max_requests: settings.max_requests,
            window_duration: settings.window(),
            enabled: settings.enabled,
        }
    }
}

/// Per-client window state
#[derive(Debug, Clone)]
struct RequestRecord {
    count: u32,
    window_start: Instant,
}

/// Outcome of a quota check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Rejected { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// Rate limiter backed by a sharded map.
///
/// The entry guard holds the shard lock for the whole check-and-update, so
/// concurrent requests from one client never lose an increment.
pub struct RateLimiter {
    config: RateLimitConfig,
    records: DashMap<String, RequestRecord>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            records: DashMap::new(),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check a request from `client_key` at the current instant
    pub fn check(&self, client_key: &str) -> RateLimitDecision {
        self.check_at(client_key, Instant::now())
    }

    /// Check a request from `client_key` as if it arrived at `now`
    pub fn check_at(&self, client_key: &str, now: Instant) -> RateLimitDecision {
        if !self.config.enabled {
            return RateLimitDecision::Allowed {
                remaining: self.config.max_requests,
            };
        }

        let mut entry = self
            .records
            .entry(client_key.to_string())
            .or_insert(RequestRecord {
                count: 0,
                window_start: now,
            });
        let record = entry.value_mut();

        let elapsed = now.saturating_duration_since(record.window_start);
        if record.count == 0 || elapsed >= self.config.window_duration {
            record.count = 1;
            record.window_start = now;
            debug!(client = client_key, "Rate limit window started");
            return RateLimitDecision::Allowed {
                remaining: self.config.max_requests.saturating_sub(1),
            };
        }

        if record.count >= self.config.max_requests {
            let retry_after = self.config.window_duration.saturating_sub(elapsed);
            warn!(
                "Rate limit exceeded for client: {} ({} requests in window)",
                client_key, record.count
            );
            return RateLimitDecision::Rejected { retry_after };
        }

        record.count += 1;
        debug!(
            "Request allowed for client: {} ({}/{})",
            client_key, record.count, self.config.max_requests
        );

        RateLimitDecision::Allowed {
            remaining: self.config.max_requests - record.count,
        }
    }

    /// Drop records whose window has elapsed
    pub fn cleanup_expired_at(&self, now: Instant) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| {
            now.saturating_duration_since(record.window_start) < self.config.window_duration
        });
        let removed = before.saturating_sub(self.records.len());
        debug!("Cleaned up {} expired rate limit records", removed);
        removed
    }

    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_at(Instant::now())
    }

    /// Start background cleanup task; it runs once per window until shutdown
    pub fn start_cleanup_task(
        self: Arc<Self>,
        shutdown: ShutdownNotifier,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let period = self.config.window_duration;
            let mut interval =
                tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            let stop = shutdown.wait();
            tokio::pin!(stop);

            loop {
                tokio::select! {
                    _ = &mut stop => {
                        debug!("Rate limit cleanup stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        self.cleanup_expired();
                    }
                }
            }
        })
    }

    /// Get statistics
    pub fn stats(&self) -> RateLimitStats {
        RateLimitStats {
            tracked_clients: self.records.len(),
            max_requests: self.config.max_requests,
            window_secs: self.config.window_duration.as_secs(),
        }
    }
}

/// Rate limit statistics
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStats {
    pub tracked_clients: usize,
    pub max_requests: u32,
    pub window_secs: u64,
}

/// Body of a 429 response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitedBody {
    pub error: String,
    pub reset_time: String,
    pub retry_after_secs: u64,
}

/// Resolve the key used to bucket a request.
///
/// With `trust_proxy_hops = n`, the n-th address from the right of
/// `X-Forwarded-For` is the client; the leftmost entry is used when the
/// header is shorter than that.
pub fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy_hops: usize,
) -> String {
    if trust_proxy_hops > 0 {
        let forwarded: Vec<&str> = headers
            .get_all("x-forwarded-for")
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .collect();

        if !forwarded.is_empty() {
            let index = forwarded.len().saturating_sub(trust_proxy_hops);
            return forwarded[index].to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rate limiting middleware.
///
/// Rejected requests short-circuit here and never reach the accounting
/// layer, so they are tallied only in the `rate_limited` counter.
pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(req.headers(), peer, state.config.server.trust_proxy_hops);
    let limit = state.rate_limiter.config().max_requests;

    match state.rate_limiter.check(&key) {
        RateLimitDecision::Allowed { remaining } => {
            let mut response = next.run(req).await;
            let headers = response.headers_mut();
            headers.insert("x-ratelimit-limit", HeaderValue::from(limit));
            headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));
            response
        }
        RateLimitDecision::Rejected { retry_after } => {
            state.counters.record_rate_limited();
            warn!(
                client = %key,
                limit,
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );
            rejection_response(retry_after)
        }
    }
}

fn rejection_response(retry_after: Duration) -> Response {
    // Round up so clients never retry a moment too early.
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    let reset_at = chrono::Utc::now()
        + chrono::Duration::from_std(retry_after).unwrap_or_else(|_| chrono::Duration::zero());

    let body = RateLimitedBody {
        error: "Too many requests, please try again later".to_string(),
        reset_time: reset_at.to_rfc3339(),
        retry_after_secs: secs,
    };

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert("retry-after", HeaderValue::from(secs));
    response
}
