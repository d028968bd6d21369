//! ACL Error Types

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use lc_common::permissions::{AccessRoleId, PermissionBits, ResourceType};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AclError {
    #[error("Missing required permission on this resource")]
    Forbidden(PermissionBits),

    #[error("Role {role} does not apply to {resource_type} resources")]
    RoleMismatch {
        role: AccessRoleId,
        resource_type: ResourceType,
    },

    #[error("Resource already has an owner")]
    AlreadyOwned,

    #[error(transparent)]
    Validation(#[from] lc_common::Error),
}

impl IntoResponse for AclError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = match &self {
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::RoleMismatch { .. } => (StatusCode::BAD_REQUEST, "ROLE_MISMATCH"),
            Self::AlreadyOwned => (StatusCode::CONFLICT, "ALREADY_OWNED"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        };
        let mut body = json!({ "error": code, "message": self.to_string() });
        match &self {
            Self::Forbidden(required) => body["required"] = json!(required.bits()),
            Self::Validation(e) => body["issues"] = json!(e.issues()),
            _ => {}
        }
        (status, Json(body)).into_response()
    }
}
