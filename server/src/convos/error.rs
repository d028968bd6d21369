//! Conversation Error Types

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ConvoError {
    #[error("Endpoint has no option schema: {0}")]
    UnsupportedEndpoint(String),

    #[error(transparent)]
    Validation(#[from] lc_common::Error),
}

impl From<validator::ValidationErrors> for ConvoError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.into())
    }
}

impl IntoResponse for ConvoError {
    fn into_response(self) -> axum::response::Response {
        let code = match &self {
            Self::UnsupportedEndpoint(_) => "UNSUPPORTED_ENDPOINT",
            Self::Validation(_) => "VALIDATION_ERROR",
        };
        let mut body = json!({ "error": code, "message": self.to_string() });
        if let Self::Validation(e) = &self {
            body["issues"] = json!(e.issues());
        }
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}
