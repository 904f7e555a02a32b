//! Error types for finreport-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use finreport_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    InternalError { message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        let message = error.to_string();
        if error.is_validation() {
            ApiError::BadRequest { message }
        } else {
            ApiError::InternalError { message }
        }
    }
}

/// Errors are returned as `{"error": "<message>"}`
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_bad_requests() {
        let error = ApiError::from(CoreError::MissingMovements);
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.to_string(), "No se recibieron movimientos");
    }

    #[test]
    fn test_generation_errors_are_internal() {
        let error = ApiError::from(CoreError::InvalidDate { value: "ayer".to_string() });
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.to_string().contains("ayer"));
    }
}
