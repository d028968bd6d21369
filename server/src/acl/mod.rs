//! Resource Access Control
//!
//! Per-resource ACL entries for agents and prompt groups, principal
//! resolution, and the share-dialog API.

pub mod error;
pub mod handlers;
pub mod resolver;
pub mod sharing;
pub mod store;
pub mod types;

use axum::routing::{get, post};
use axum::Router;

use crate::api::AppState;

pub use error::AclError;
pub use store::{AclEntry, AclStore, PrincipalKey, ResourceKey};

/// Create the ACL router.
///
/// Mounted at `/api/permissions`; every route requires auth.
/// - GET /{resource_type}/roles - Access roles of a resource type
/// - GET /{resource_type}/accessible - Resources the caller can reach
/// - GET, PUT /{resource_type}/{resource_id} - Share dialog state
/// - GET /{resource_type}/{resource_id}/entries - Raw ACL rows
/// - GET /{resource_type}/{resource_id}/effective - Caller's bits
/// - POST /{resource_type}/{resource_id}/owner - Claim an unshared resource
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{resource_type}/roles", get(handlers::get_available_roles))
        .route(
            "/{resource_type}/accessible",
            get(handlers::list_accessible_resources),
        )
        .route(
            "/{resource_type}/{resource_id}",
            get(handlers::get_resource_permissions).put(handlers::update_resource_permissions),
        )
        .route(
            "/{resource_type}/{resource_id}/entries",
            get(handlers::get_resource_entries),
        )
        .route(
            "/{resource_type}/{resource_id}/effective",
            get(handlers::get_effective_permissions),
        )
        .route(
            "/{resource_type}/{resource_id}/owner",
            post(handlers::claim_ownership),
        )
}
