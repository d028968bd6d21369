//! Principal HTTP Handlers

use axum::extract::{Query, State};
use axum::Json;
use lc_common::permissions::{
    Permission, PermissionType, PrincipalSearchParams, PrincipalSearchResponse, PrincipalType,
    RolePermissions, SearchablePrincipalType, SourceCounts, SystemRole,
};
use serde::Deserialize;
use validator::Validate;

use crate::api::extract::JsonBody;
use crate::api::AppState;
use crate::auth::AuthUser;

use super::directory::{EntraGroup, SyncReport};
use super::error::PrincipalError;
use super::search::{search_principals as search_directory, sort_by_relevance};

/// Upper bound of the `limit` query parameter.
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// Principal types a role may see in the people picker.
fn visible_types(permissions: &RolePermissions) -> Vec<SearchablePrincipalType> {
    [
        (SearchablePrincipalType::User, Permission::ViewUsers),
        (SearchablePrincipalType::Group, Permission::ViewGroups),
        (SearchablePrincipalType::Role, Permission::ViewRoles),
    ]
    .into_iter()
    .filter(|&(_, permission)| permissions.get(PermissionType::PeoplePicker, permission))
    .map(|(kind, _)| kind)
    .collect()
}

/// Search users, groups and roles to share a resource with.
///
/// GET /api/permissions/search-principals
#[utoipa::path(
    get,
    path = "/api/permissions/search-principals",
    tag = "permissions",
    params(PrincipalSearchParams),
    responses(
        (status = 200, body = PrincipalSearchResponse),
        (status = 400, description = "Invalid query"),
        (status = 403, description = "Role may not view the requested principals"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state))]
pub async fn search_principals(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<PrincipalSearchParams>,
) -> Result<Json<PrincipalSearchResponse>, PrincipalError> {
    params.validate()?;

    let visible = visible_types(&state.directory.role_permissions(auth_user.role));
    let types = match params.principal_type {
        Some(kind) if !visible.contains(&kind) => {
            return Err(PrincipalError::Forbidden(PrincipalType::from(kind).as_str()));
        }
        Some(kind) => vec![kind],
        None if visible.is_empty() => return Err(PrincipalError::Forbidden("principals")),
        None => visible,
    };

    let limit = params
        .limit
        .unwrap_or(state.config.principal_search_limit)
        .clamp(1, MAX_SEARCH_LIMIT);
    let pattern = params.q.trim();

    let mut results = search_directory(&state.directory, pattern, limit as usize, Some(&types));
    sort_by_relevance(&mut results, pattern);
    results.truncate(limit as usize);

    tracing::debug!(count = results.len(), "Principal search");

    Ok(Json(PrincipalSearchResponse {
        query: params.q.clone(),
        limit,
        principal_type: params.principal_type,
        count: results.len(),
        sources: SourceCounts::tally(&results),
        results,
    }))
}

/// Body of an Entra membership sync.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntraSyncRequest {
    /// Directory user whose memberships are replaced.
    pub user_id: String,
    /// Groups from the identity provider's verified claims.
    pub groups: Vec<EntraGroup>,
}

/// Replace a user's Entra group memberships.
///
/// Admin only. Group claims come from the identity provider, never from the
/// user being synced.
///
/// POST /api/principals/entra-sync
#[utoipa::path(
    post,
    path = "/api/principals/entra-sync",
    tag = "principals",
    request_body = EntraSyncRequest,
    responses(
        (status = 200, body = SyncReport),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "User is not in the directory"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, request), fields(user_id = %request.user_id))]
pub async fn sync_entra_groups(
    State(state): State<AppState>,
    auth_user: AuthUser,
    JsonBody(request): JsonBody<EntraSyncRequest>,
) -> Result<Json<SyncReport>, PrincipalError> {
    if auth_user.role != SystemRole::Admin {
        tracing::warn!(actor = %auth_user.id, "Non-admin attempted an Entra group sync");
        return Err(PrincipalError::NotAdmin);
    }
    let report = state
        .directory
        .sync_entra_groups(&request.user_id, &request.groups)?;
    Ok(Json(report))
}
