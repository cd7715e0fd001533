//! Error types for the probe server
//!
//! Provides unified error handling using thiserror.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::models::ErrorResponse;

// == App Error Enum ==
/// Unified error type for the probe server.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed client input, rejected before touching a store
    #[error("{0}")]
    InvalidRequest(String),

    /// Requested row does not exist
    #[error("{0}")]
    NotFound(String),

    /// Key-value store unreachable or command failed
    #[error("{0}")]
    Redis(#[from] redis::RedisError),

    /// Relational store unreachable or query failed
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    /// Any other server-side failure
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Redis(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            error!(%status, "request failed: {}", message);
        } else {
            warn!(%status, "request rejected: {}", message);
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the probe server.
pub type Result<T> = std::result::Result<T, AppError>;
