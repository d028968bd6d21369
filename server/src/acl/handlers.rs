//! ACL HTTP Handlers
//!
//! Role listing, share-dialog reads and writes, effective bits, and
//! ownership seeding for agents and prompt groups.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use lc_common::permissions::{
    default_roles, AvailableRolesResponse, EffectivePermissionsResponse,
    GetResourcePermissionsResponse, PermissionBits, ResourcePermissionsResponse, ResourceType,
    UpdateResourcePermissionsRequest, UpdateResourcePermissionsResponse,
};

use crate::api::extract::JsonBody;
use crate::api::AppState;
use crate::auth::AuthUser;

use super::error::AclError;
use super::resolver::user_principals;
use super::sharing;
use super::store::ResourceKey;
use super::types::{AccessibleQuery, AccessibleResourcesResponse, OwnershipResponse};

fn parse_resource_type(raw: &str) -> Result<ResourceType, AclError> {
    Ok(raw.parse()?)
}

/// `requiredPermission` must be a non-empty set of known bits.
fn required_permission(raw: Option<u32>) -> Result<PermissionBits, AclError> {
    match raw {
        None => Ok(PermissionBits::VIEW),
        Some(bits) => PermissionBits::from_bits(bits)
            .filter(|bits| !bits.is_empty())
            .ok_or_else(|| {
                lc_common::Error::invalid(
                    "requiredPermission",
                    format!("Unknown permission bits: {bits}"),
                )
                .into()
            }),
    }
}

fn resource_key(resource_type: &str, resource_id: String) -> Result<ResourceKey, AclError> {
    Ok(ResourceKey::new(parse_resource_type(resource_type)?, resource_id))
}

// ============================================================================
// Roles
// ============================================================================

/// List the access roles of a resource type.
///
/// GET /api/permissions/{resource_type}/roles
#[utoipa::path(
    get,
    path = "/api/permissions/{resource_type}/roles",
    tag = "permissions",
    params(("resource_type" = String, Path, description = "agent or promptGroup")),
    responses(
        (status = 200, body = AvailableRolesResponse),
        (status = 400, description = "Unknown resource type"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument]
pub async fn get_available_roles(
    Path(resource_type): Path<String>,
) -> Result<Json<AvailableRolesResponse>, AclError> {
    let resource_type = parse_resource_type(&resource_type)?;
    let roles = default_roles()
        .into_iter()
        .filter(|r| r.resource_type == resource_type)
        .collect();
    Ok(Json(AvailableRolesResponse {
        resource_type,
        roles,
    }))
}

// ============================================================================
// Resource ACL
// ============================================================================

/// Principals with access to a resource.
///
/// GET /api/permissions/{resource_type}/{resource_id}
#[utoipa::path(
    get,
    path = "/api/permissions/{resource_type}/{resource_id}",
    tag = "permissions",
    params(
        ("resource_type" = String, Path, description = "agent or promptGroup"),
        ("resource_id" = String, Path, description = "Resource ID"),
    ),
    responses(
        (status = 200, body = GetResourcePermissionsResponse),
        (status = 403, description = "Caller lacks SHARE"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state))]
pub async fn get_resource_permissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((resource_type, resource_id)): Path<(String, String)>,
) -> Result<Json<GetResourcePermissionsResponse>, AclError> {
    let resource = resource_key(&resource_type, resource_id)?;
    sharing::require_permission(
        &state.acl,
        &state.directory,
        &auth_user,
        &resource,
        PermissionBits::SHARE,
    )?;
    Ok(Json(sharing::get_resource_permissions(
        &state.acl,
        &state.directory,
        &resource,
    )))
}

/// Grant, revoke and publish access to a resource.
///
/// PUT /api/permissions/{resource_type}/{resource_id}
#[utoipa::path(
    put,
    path = "/api/permissions/{resource_type}/{resource_id}",
    tag = "permissions",
    params(
        ("resource_type" = String, Path, description = "agent or promptGroup"),
        ("resource_id" = String, Path, description = "Resource ID"),
    ),
    request_body = UpdateResourcePermissionsRequest,
    responses(
        (status = 200, body = UpdateResourcePermissionsResponse),
        (status = 400, description = "Invalid principals or roles"),
        (status = 403, description = "Caller lacks SHARE"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state, request))]
pub async fn update_resource_permissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((resource_type, resource_id)): Path<(String, String)>,
    JsonBody(request): JsonBody<UpdateResourcePermissionsRequest>,
) -> Result<Json<UpdateResourcePermissionsResponse>, AclError> {
    let resource = resource_key(&resource_type, resource_id)?;
    let results = sharing::update_resource_permissions(
        &state.acl,
        &state.directory,
        &auth_user,
        &resource,
        &request,
    )?;
    Ok(Json(UpdateResourcePermissionsResponse {
        message: "Permissions updated successfully".to_string(),
        results,
    }))
}

/// Every ACL row of a resource with grant details.
///
/// GET /api/permissions/{resource_type}/{resource_id}/entries
#[utoipa::path(
    get,
    path = "/api/permissions/{resource_type}/{resource_id}/entries",
    tag = "permissions",
    params(
        ("resource_type" = String, Path, description = "agent or promptGroup"),
        ("resource_id" = String, Path, description = "Resource ID"),
    ),
    responses(
        (status = 200, body = ResourcePermissionsResponse),
        (status = 403, description = "Caller lacks SHARE"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state))]
pub async fn get_resource_entries(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((resource_type, resource_id)): Path<(String, String)>,
) -> Result<Json<ResourcePermissionsResponse>, AclError> {
    let resource = resource_key(&resource_type, resource_id)?;
    sharing::require_permission(
        &state.acl,
        &state.directory,
        &auth_user,
        &resource,
        PermissionBits::SHARE,
    )?;
    Ok(Json(sharing::resource_entries(
        &state.acl,
        &state.directory,
        &resource,
    )))
}

/// The caller's combined bits on a resource.
///
/// GET /api/permissions/{resource_type}/{resource_id}/effective
#[utoipa::path(
    get,
    path = "/api/permissions/{resource_type}/{resource_id}/effective",
    tag = "permissions",
    params(
        ("resource_type" = String, Path, description = "agent or promptGroup"),
        ("resource_id" = String, Path, description = "Resource ID"),
    ),
    responses(
        (status = 200, body = EffectivePermissionsResponse),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state))]
pub async fn get_effective_permissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((resource_type, resource_id)): Path<(String, String)>,
) -> Result<Json<EffectivePermissionsResponse>, AclError> {
    let resource = resource_key(&resource_type, resource_id)?;
    let bits = sharing::effective_permissions(&state.acl, &state.directory, &auth_user, &resource);
    Ok(Json(EffectivePermissionsResponse {
        permission_bits: bits.bits(),
    }))
}

/// Become the owner of a resource that has no ACL entries yet.
///
/// POST /api/permissions/{resource_type}/{resource_id}/owner
#[utoipa::path(
    post,
    path = "/api/permissions/{resource_type}/{resource_id}/owner",
    tag = "permissions",
    params(
        ("resource_type" = String, Path, description = "agent or promptGroup"),
        ("resource_id" = String, Path, description = "Resource ID"),
    ),
    responses(
        (status = 201, body = OwnershipResponse),
        (status = 409, description = "Resource already has ACL entries"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state))]
pub async fn claim_ownership(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((resource_type, resource_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<OwnershipResponse>), AclError> {
    let resource = resource_key(&resource_type, resource_id)?;
    let entry = sharing::claim_ownership(&state.acl, &auth_user, &resource)?;
    Ok((
        StatusCode::CREATED,
        Json(OwnershipResponse {
            resource_type: entry.resource.resource_type,
            resource_id: entry.resource.resource_id,
            access_role_id: sharing::owner_role(resource.resource_type),
            permission_bits: entry.perm_bits.bits(),
        }),
    ))
}

/// Resources of a type the caller can reach with the given bits.
///
/// GET /api/permissions/{resource_type}/accessible
#[utoipa::path(
    get,
    path = "/api/permissions/{resource_type}/accessible",
    tag = "permissions",
    params(
        ("resource_type" = String, Path, description = "agent or promptGroup"),
        AccessibleQuery,
    ),
    responses(
        (status = 200, body = AccessibleResourcesResponse),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(state))]
pub async fn list_accessible_resources(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(resource_type): Path<String>,
    Query(query): Query<AccessibleQuery>,
) -> Result<Json<AccessibleResourcesResponse>, AclError> {
    let resource_type = parse_resource_type(&resource_type)?;
    let required = required_permission(query.required_permission)?;
    let principals = user_principals(&state.directory, &auth_user);
    let resource_ids = state
        .acl
        .find_accessible_resources(&principals, resource_type, required);
    Ok(Json(AccessibleResourcesResponse {
        resource_type,
        required_permission: required.bits(),
        resource_ids,
    }))
}
