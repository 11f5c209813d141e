//! JSON error envelope for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use filegate_shared::AppError;
use serde_json::json;

/// Error returned by route handlers.
///
/// Renders as `{"success": false, "error": <message>}` with the status
/// mapped from the wrapped [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (
            status,
            Json(json!({
                "success": false,
                "error": self.0.message()
            })),
        )
            .into_response()
    }
}
