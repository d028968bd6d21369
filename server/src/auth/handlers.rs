//! Authentication HTTP Handlers

use axum::extract::State;
use axum::Json;
use lc_common::permissions::{RolePermissions, SystemRole};
use serde::Serialize;

use crate::api::AppState;

use super::middleware::AuthUser;

/// Current user with the feature permissions of their role.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: SystemRole,
    /// Feature flags keyed by permission type.
    #[schema(value_type = Object)]
    pub permissions: RolePermissions,
}

/// Get the current user.
///
/// GET /auth/me
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, body = CurrentUserResponse),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state))]
pub async fn get_current_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Json<CurrentUserResponse> {
    let permissions = state.directory.role_permissions(auth_user.role);
    Json(CurrentUserResponse {
        id: auth_user.id,
        name: auth_user.name,
        username: auth_user.username,
        email: auth_user.email,
        role: auth_user.role,
        permissions,
    })
}
