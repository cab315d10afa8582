//! HTTP mapping for library errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use placeshape::Error;

#[derive(Debug)]
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.0.to_string();
        let (status, error, details) = match self.0 {
            Error::Lookup(_) => (StatusCode::NOT_FOUND, "location_not_found", None),
            Error::Fetch { raw, .. } => (StatusCode::BAD_GATEWAY, "fetch_failed", raw),
            Error::Validation { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_geojson", None)
            }
            Error::Config(_) | Error::Io(_) => {
                tracing::error!(error = %message, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error,
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}
