//! API error type and HTTP error responses.
//!
//! Only `RequiredSteps` is part of normal control flow — it gets a 422 with
//! an in-context message the UI can show next to the form.  Everything else
//! is a generic failure response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use catalog::CatalogError;
use engine::EngineError;
use store::StoreError;

#[derive(Debug)]
pub enum ApiError {
    /// Workflow (or other resource) does not exist.
    NotFound(String),
    /// Missing or ambiguous actor identity, or an otherwise malformed request.
    BadRequest(String),
    /// Completion refused: required steps are still incomplete.
    RequiredSteps(Vec<u32>),
    /// Anything the caller can't fix.
    Internal(String),
}

/// Error response body.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_steps: Option<Vec<u32>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message, missing_steps) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::RequiredSteps(missing) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "required_steps_incomplete",
                "please complete required steps before continuing".to_owned(),
                Some(missing),
            ),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None)
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: error.to_owned(),
                message,
                missing_steps,
            }),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::RequiredStepsIncomplete { missing } => ApiError::RequiredSteps(missing),
            // A stale or tampered session blob; the client should restart.
            EngineError::InvalidState(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => {
                ApiError::NotFound(format!("workflow '{id}' not found"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
