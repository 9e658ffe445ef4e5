//! API route configuration

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    handle_faults, panic_to_fault, rate_limit, track_requests, with_security_headers,
};

use super::handlers::{self, AppState};

/// Build the complete API router with middleware
pub fn build_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/dashboard", get(handlers::dashboard))
        .route("/api/demo", get(handlers::demo));

    apply_middleware(routes, state)
}

/// Wrap `routes` in the request chain.
///
/// Layers added later run first, so the request order is: trace, security
/// headers, CORS, body limit, rate limit, accounting, fault handling,
/// panic capture, then the routes or the 404 fallback.
pub fn apply_middleware(routes: Router<AppState>, state: AppState) -> Router {
    let body_limit = state.config.server.max_body_size_mb * 1024 * 1024;
    let cors = cors_layer(&state.config);

    let router = routes
        .fallback(handlers::not_found)
        .layer(CatchPanicLayer::custom(panic_to_fault))
        .layer(axum::middleware::from_fn_with_state(state.clone(), handle_faults))
        .layer(axum::middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .with_state(state);

    with_security_headers(router).layer(TraceLayer::new_for_http())
}

/// CORS policy for the configured environment
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors
        .origins_for(config.environment)
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Skipping invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(config.cors.allow_credentials)
}
