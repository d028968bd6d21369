//! Message Error Types

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error(transparent)]
    Validation(#[from] lc_common::Error),
}

impl IntoResponse for MessageError {
    fn into_response(self) -> axum::response::Response {
        let Self::Validation(e) = &self;
        let body = json!({
            "error": "VALIDATION_ERROR",
            "message": self.to_string(),
            "issues": e.issues(),
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}
