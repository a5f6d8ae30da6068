//! HTTP Error Mapping
//!
//! Maps application errors to status codes. Bodies are plain text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use queuelength_core::domain::DomainError;
use queuelength_core::error::AppError;
use tracing::error;

/// AppError wrapper that knows its status code
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// Status code for an application error
pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::Domain(DomainError::InvalidDelay(_)) => StatusCode::BAD_REQUEST,
        AppError::Domain(DomainError::QueueFull { .. }) => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Domain(DomainError::QueueClosed) => StatusCode::SERVICE_UNAVAILABLE,
        AppError::InvalidState(_) => StatusCode::CONFLICT,
        AppError::Domain(DomainError::InvalidCapacity)
        | AppError::Config(_)
        | AppError::Resolve(_)
        | AppError::Report(_)
        | AppError::Execution(_)
        | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!(error = %self.0, "Request failed");
        }
        (status, self.0.to_string()).into_response()
    }
}
