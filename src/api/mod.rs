//! HTTP surface: handlers, shared state and router assembly

pub mod handlers;
pub mod routes;

pub use handlers::{AppState, AVAILABLE_ENDPOINTS};
pub use routes::{apply_middleware, build_router, cors_layer};
