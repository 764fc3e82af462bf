//! # Error Handling Middleware
//!
//! Maps the domain error taxonomy to HTTP responses. Every failure
//! resolves to a distinguishable JSON body carrying both a human-readable
//! message and a machine-readable code, so clients can decide retry vs.
//! abandon without string matching. `RescheduleBookFailed` keeps its own
//! code: the caller must learn the old slot is already gone.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tutorsync_core::errors::TutorError;

/// Application error wrapper that provides HTTP status code mapping.
#[derive(Debug)]
pub struct AppError(pub TutorError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map error types to HTTP status codes
        let status = match &self.0 {
            TutorError::NotFound(_) => StatusCode::NOT_FOUND,
            TutorError::Validation(_) => StatusCode::BAD_REQUEST,
            TutorError::Authentication(_) => StatusCode::UNAUTHORIZED,
            TutorError::Authorization(_) => StatusCode::FORBIDDEN,
            // State-precondition conflicts: recoverable by refreshing
            // state and picking again.
            TutorError::Full(_)
            | TutorError::AlreadyBooked(_)
            | TutorError::NotBooked(_)
            | TutorError::AlreadySubmitted(_)
            | TutorError::Overlap(_)
            | TutorError::RescheduleBookFailed { .. } => StatusCode::CONFLICT,
            TutorError::Database(_) | TutorError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.0.to_string(),
            "code": self.0.code(),
        }));

        (status, body).into_response()
    }
}

/// Allows using the `?` operator with `TutorResult` in handlers.
impl From<TutorError> for AppError {
    fn from(err: TutorError) -> Self {
        AppError(err)
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(TutorError::Database(err))
    }
}
