//! Terminal error handling for handler faults

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::any::Any;
use tracing::error;

use crate::api::AppState;
use crate::error::HandlerFault;
use crate::observability::RequestCounters;

/// Body of the uniform 500 response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: &'static str,
    pub timestamp: String,
    pub request_id: u64,
}

/// Replace any response marked with [`HandlerFault`] by the uniform 500 body
pub async fn handle_faults(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let response = next.run(req).await;

    match response.extensions().get::<HandlerFault>() {
        Some(fault) => fault_response(&state.counters, fault),
        None => response,
    }
}

/// Count the fault, log it, and build the 500 response
pub fn fault_response(counters: &RequestCounters, fault: &HandlerFault) -> Response {
    let error_count = counters.record_error();
    error!(error_count, "Error #{}: {}", error_count, fault.message);

    let body = ErrorBody {
        error: "Internal server error",
        timestamp: chrono::Utc::now().to_rfc3339(),
        request_id: counters.total_requests(),
    };

    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Convert a caught handler panic into a marked fault response.
///
/// Used with `CatchPanicLayer::custom` inside the fault layer, so panics and
/// returned errors share one path.
pub fn panic_to_fault(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    HandlerFault::new(format!("panic: {}", message)).into_marked_response()
}
