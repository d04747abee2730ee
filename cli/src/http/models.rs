//! Request and response bodies, and the handler error type.

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use proctor_core::api::{EngineError, PersistError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `POST /log-event` body; `log` is checked by the handler.
#[derive(Debug, Clone, Deserialize)]
pub struct LogEventRequest {
    #[serde(default)]
    pub log: Option<String>,
}

/// `{"message": ...}` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{"error": ...}` failure body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `GET /health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub session_id: String,
    pub uptime_seconds: f64,
    pub requests_handled: u64,
    pub errors_total: u64,
    pub requests_by_route: HashMap<String, u64>,
    pub timestamp: String,
}

/// Handler failure, rendered as an `ErrorResponse`.
#[derive(Debug, Error)]
pub enum HttpServerError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl HttpServerError {
    /// Bad input is 400, a stopped session is 503, storage failures are 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            HttpServerError::Engine(EngineError::UnknownCategory(_))
            | HttpServerError::Engine(EngineError::UnknownLabel(_)) => StatusCode::BAD_REQUEST,
            HttpServerError::Engine(EngineError::SessionClosed) => StatusCode::SERVICE_UNAVAILABLE,
            HttpServerError::Engine(EngineError::Persist(_)) | HttpServerError::Persist(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(target: "proctor.http", error = %self, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
