//! Error types for the status service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Result type alias for status service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Main error type for the status service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Keep-alive error: {0}")]
    KeepAlive(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Shorthand for an internal fault raised by a handler
    pub fn internal(message: impl Into<String>) -> Self {
        ServiceError::Internal(message.into())
    }
}

impl From<config::ConfigError> for ServiceError {
    fn from(err: config::ConfigError) -> Self {
        ServiceError::Config(err.to_string())
    }
}

/// Marker attached to the response of a failed handler.
///
/// The fault middleware looks for this extension and turns the response
/// into the uniform 500 body, so handlers never need access to the counters.
#[derive(Debug, Clone)]
pub struct HandlerFault {
    pub message: String,
}

impl HandlerFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Empty 500 response carrying this fault as an extension
    pub fn into_marked_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        HandlerFault::new(self.to_string()).into_marked_response()
    }
}
