#[cfg(feature = "ssr")]
use crate::error::AppError;
#[cfg(feature = "ssr")]
use axum::http::StatusCode;
#[cfg(feature = "ssr")]
use axum::response::{IntoResponse, Response};

/// API-specific error wrapper that converts AppError into HTTP responses.
#[cfg(feature = "ssr")]
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Search(err) => {
                tracing::error!("Search request failed: {err}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "search unavailable".to_string(),
                )
            }
            AppError::Database(msg) => {
                tracing::error!("Database error during request: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {}", msg),
                )
            }
            AppError::Config(msg) | AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}
