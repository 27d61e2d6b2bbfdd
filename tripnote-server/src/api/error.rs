use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tripnote_types::ErrorResponse;

use crate::feed::FeedFilterError;
use crate::geocoding::GeocodeError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// No credential was presented
    AuthRequired(String),
    /// The credential was rejected
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    PayloadTooLarge(String),
    Upstream(String),
    NotConfigured(String),
    InternalError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::AuthRequired(_) => StatusCode::FORBIDDEN,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Upstream(_) | ApiError::NotConfigured(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::AuthRequired(_) => "AUTH_REQUIRED",
            ApiError::Unauthorized(_) => "AUTH_INVALID",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::Upstream(_) => "UPSTREAM_ERROR",
            ApiError::NotConfigured(_) => "UPSTREAM_NOT_CONFIGURED",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match self {
            ApiError::Upstream(detail) => {
                tracing::error!("Upstream error: {}", detail);
                "Upstream service request failed".to_string()
            }
            ApiError::NotConfigured(detail) => {
                tracing::error!("Upstream not configured: {}", detail);
                "Upstream service is not configured".to_string()
            }
            ApiError::InternalError(detail) => {
                tracing::error!("Internal error: {}", detail);
                "An unexpected error occurred".to_string()
            }
            ApiError::BadRequest(msg)
            | ApiError::AuthRequired(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::PayloadTooLarge(msg) => msg,
        };

        let error_response = ErrorResponse {
            code: code.to_string(),
            message,
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(format!("{err:#}"))
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<GeocodeError> for ApiError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NotConfigured(what) => ApiError::NotConfigured(what.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<FeedFilterError> for ApiError {
    fn from(err: FeedFilterError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
