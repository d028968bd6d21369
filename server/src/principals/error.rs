//! Principal Error Types

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum PrincipalError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Missing permission to view {0}")]
    Forbidden(&'static str),

    #[error("System admin privileges required")]
    NotAdmin,

    #[error(transparent)]
    Validation(#[from] lc_common::Error),
}

impl From<validator::ValidationErrors> for PrincipalError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.into())
    }
}

impl IntoResponse for PrincipalError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = match &self {
            Self::UserNotFound(_) => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::NotAdmin => (StatusCode::FORBIDDEN, "NOT_ADMIN"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        };
        let mut body = json!({ "error": code, "message": self.to_string() });
        if let Self::Validation(e) = &self {
            body["issues"] = json!(e.issues());
        }
        (status, Json(body)).into_response()
    }
}
