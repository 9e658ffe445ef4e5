//! Middleware components for request processing

pub mod accounting;
pub mod faults;
pub mod rate_limiter;
pub mod security_headers;

pub use accounting::track_requests;
pub use faults::{handle_faults, panic_to_fault, ErrorBody};
pub use rate_limiter::{
    client_key, rate_limit, RateLimitConfig, RateLimitDecision, RateLimitStats, RateLimiter,
};
pub use security_headers::{with_security_headers, SECURITY_HEADERS};
