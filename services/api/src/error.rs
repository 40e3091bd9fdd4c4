use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bugline_common::error::BuglineError;

pub struct ApiError(pub BuglineError);

impl From<BuglineError> for ApiError {
    fn from(err: BuglineError) -> Self {
        Self(err)
    }
}

/// Failure envelope shared by handlers and extractors.
pub fn error_body(kind: &str, message: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": false,
        "error": { "kind": kind, "message": message },
    }))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BuglineError::NotFound(_) => StatusCode::NOT_FOUND,
            BuglineError::Validation(_) => StatusCode::BAD_REQUEST,
            BuglineError::Unauthorized(_) => StatusCode::FORBIDDEN,
            BuglineError::Conflict(_) => StatusCode::CONFLICT,
            BuglineError::Config(_) | BuglineError::Database(_) | BuglineError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Driver details stay in the logs.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
            "internal server error"
        } else {
            self.0.message()
        };

        (status, error_body(self.0.kind(), message)).into_response()
    }
}
