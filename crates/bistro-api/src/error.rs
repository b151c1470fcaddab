//! # API Errors
//!
//! Every failed request answers `{ "error": true, "message": ... }` with the
//! status code of the underlying `BistroError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bistro_core::BistroError;
use serde::Serialize;
use tracing::{debug, error};

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
        }
    }
}

/// Handler error wrapping a `BistroError`
#[derive(Debug)]
pub struct ApiError(pub BistroError);

impl From<BistroError> for ApiError {
    fn from(err: BistroError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            debug!("Request rejected ({}): {}", status, self.0);
        }

        (status, Json(ErrorResponse::new(self.0.to_string()))).into_response()
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("no access");
        assert!(err.error);
        assert_eq!(err.message, "no access");
    }

    #[test]
    fn test_status_mapping() {
        let response = ApiError::from(BistroError::unauthorized()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = ApiError::from(BistroError::Conflict("cart".into())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = ApiError::from(BistroError::Store("down".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
