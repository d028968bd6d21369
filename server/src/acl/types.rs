//! ACL request and response types not shared with clients.

use lc_common::permissions::{AccessRoleId, ResourceType};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query of the accessible resources listing.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct AccessibleQuery {
    /// Bits every listed resource must grant (default: VIEW).
    pub required_permission: Option<u32>,
}

/// Resources the caller can reach.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessibleResourcesResponse {
    pub resource_type: ResourceType,
    pub required_permission: u32,
    pub resource_ids: Vec<String>,
}

/// Entry created by an ownership claim.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipResponse {
    pub resource_type: ResourceType,
    pub resource_id: String,
    pub access_role_id: AccessRoleId,
    pub permission_bits: u32,
}
