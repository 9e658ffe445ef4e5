//! Status Service - read-only cloud status endpoints behind a hardened request chain
//!
//! The service answers a handful of JSON endpoints (project info, health,
//! metrics, dashboard, demo data). Every request passes through the same
//! middleware chain:
//!
//! security headers → CORS → body limit → rate limit → accounting →
//! routing → fault handler → 404 fallback
//!
//! ## Features
//!
//! - **Rate Limiting**: fixed-window quota per client address
//! - **Request Accounting**: lock-free counters with sequential request ids
//! - **Uniform Errors**: handler faults and panics become a fixed 500 body
//! - **Observability**: health snapshots, metrics and structured logs
//! - **Keep-alive**: optional self-ping so idle hosts are not suspended
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use status_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load("config.toml")?;
//!     let state = AppState::new(config);
//!     let shutdown = ShutdownCoordinator::new();
//!
//!     status_service::server::start_server(state, shutdown.subscribe()).await
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod keep_alive;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod shutdown;

pub use config::Config;
pub use error::{Result, ServiceError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{build_router, AppState};
    pub use crate::config::Config;
    pub use crate::error::{Result, ServiceError};
    pub use crate::keep_alive::KeepAlivePinger;
    pub use crate::middleware::{RateLimitConfig, RateLimitDecision, RateLimiter};
    pub use crate::observability::{HealthReporter, RequestCounters};
    pub use crate::shutdown::{ShutdownCoordinator, ShutdownNotifier};
}
