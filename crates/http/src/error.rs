//! Error handling for the libris HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Wire format shared by every HTTP error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: bool,
    pub msg: String,
}

/// Application error types that map to HTTP responses.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed request body or parameters.
    #[error("{0}")]
    BadRequest(String),

    /// No active record for the requested resource.
    #[error("{0}")]
    NotFound(String),

    /// Persistence or other infrastructure failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };

        tracing::error!(status = status.as_u16(), msg = %msg, "request failed");

        let body = ErrorBody { error: true, msg };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_maps_to_400() {
        let response = AppError::bad_request("invalid body").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = AppError::not_found("Book with ID 7 not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_maps_to_500() {
        let err = anyhow::anyhow!("connection reset");
        let response = AppError::Internal(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn body_carries_error_flag_and_message() {
        let response = AppError::not_found("Book with ID 7 not found").into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["error"], true);
        assert_eq!(value["msg"], "Book with ID 7 not found");
    }
}
