//! Request counting and access logging

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::info;

use crate::api::AppState;

/// Count every request that reaches this layer and log it.
///
/// The request id is the running total after the increment and is echoed
/// as `x-request-id`.
pub async fn track_requests(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let request_id = state.counters.record_request();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!(
        timestamp = %chrono::Utc::now().to_rfc3339(),
        method = %method,
        path = %path,
        request_id,
        "Request #{}", request_id
    );

    let started = Instant::now();
    let mut response = next.run(req).await;
    state.counters.record_latency(started.elapsed());

    response
        .headers_mut()
        .insert("x-request-id", HeaderValue::from(request_id));
    response
}
