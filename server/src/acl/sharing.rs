//! Resource sharing operations built on the ACL store.

use lc_common::permissions::{
    default_roles, role_for_permissions, AccessRole, AccessRoleId, GetResourcePermissionsResponse,
    PermissionBits, PermissionEntry, Principal, PrincipalSource, PrincipalType,
    ResourcePermissionsResponse, ResourceType, UpdateResourcePermissionsRequest, UpdateResults,
};

use crate::auth::AuthUser;
use crate::principals::Directory;

use super::error::AclError;
use super::resolver::user_principals;
use super::store::{AclEntry, AclStore, PrincipalKey, ResourceKey};

/// The role that grants full control over a resource type.
#[must_use]
pub const fn owner_role(resource_type: ResourceType) -> AccessRoleId {
    match resource_type {
        ResourceType::Agent => AccessRoleId::AgentOwner,
        ResourceType::PromptGroup => AccessRoleId::PromptGroupOwner,
    }
}

/// Role describing an entry: the best match for its bits, else the role it
/// was granted with.
fn entry_role(roles: &[AccessRole], entry: &AclEntry) -> Option<AccessRole> {
    role_for_permissions(roles, entry.resource.resource_type, entry.perm_bits.bits())
        .cloned()
        .or_else(|| entry.role_id.map(AccessRole::predefined))
}

/// A principal with display metadata from the directory.
fn describe(directory: &Directory, key: &PrincipalKey) -> Principal {
    let mut principal = Principal::new(key.principal_type, key.principal_id.clone());
    let Some(id) = key.principal_id.as_deref() else {
        return principal;
    };
    match key.principal_type {
        PrincipalType::User => {
            if let Some(user) = directory.user(id) {
                principal.name = user.name.or_else(|| user.username.clone());
                principal.email = user.email;
                principal.avatar = user.avatar;
                principal.source = Some(PrincipalSource::Local);
                principal.id_on_the_source = user.id_on_the_source;
            }
        }
        PrincipalType::Group => {
            if let Some(group) = directory.group(id) {
                principal.member_count = Some(group.member_ids.len() as u64);
                principal.name = Some(group.name);
                principal.email = group.email;
                principal.avatar = group.avatar;
                principal.description = group.description;
                principal.source = Some(group.source);
                principal.id_on_the_source = group.id_on_the_source;
            }
        }
        PrincipalType::Role => principal.name = Some(id.to_string()),
        PrincipalType::Public => {}
    }
    principal
}

/// Bits the caller holds on a resource.
#[must_use]
pub fn effective_permissions(
    store: &AclStore,
    directory: &Directory,
    user: &AuthUser,
    resource: &ResourceKey,
) -> PermissionBits {
    store.effective_permissions(&user_principals(directory, user), resource)
}

/// Fail unless a single entry of the caller holds `required`.
pub fn require_permission(
    store: &AclStore,
    directory: &Directory,
    user: &AuthUser,
    resource: &ResourceKey,
    required: PermissionBits,
) -> Result<(), AclError> {
    if store.has_permission(&user_principals(directory, user), resource, required) {
        Ok(())
    } else {
        Err(AclError::Forbidden(required))
    }
}

/// Principals with access to a resource, as the share dialog lists them.
#[must_use]
pub fn get_resource_permissions(
    store: &AclStore,
    directory: &Directory,
    resource: &ResourceKey,
) -> GetResourcePermissionsResponse {
    let roles = default_roles();
    let mut response = GetResourcePermissionsResponse {
        resource_type: resource.resource_type,
        resource_id: resource.resource_id.clone(),
        principals: Vec::new(),
        public: false,
        public_access_role_id: None,
    };

    for entry in store.entries_for_resource(resource) {
        let role_id = entry_role(&roles, &entry).map(|r| r.access_role_id);
        if entry.principal.is_public() {
            response.public = true;
            response.public_access_role_id = role_id;
        } else {
            let mut principal = describe(directory, &entry.principal);
            principal.access_role_id = role_id;
            response.principals.push(principal);
        }
    }
    response
}

/// Every ACL row of a resource with its role and grant details.
#[must_use]
pub fn resource_entries(
    store: &AclStore,
    directory: &Directory,
    resource: &ResourceKey,
) -> ResourcePermissionsResponse {
    let roles = default_roles();
    let permissions = store
        .entries_for_resource(resource)
        .into_iter()
        .filter_map(|entry| {
            let Some(role) = entry_role(&roles, &entry) else {
                tracing::debug!(entry_id = %entry.id, "Skipping ACL entry without a matching role");
                return None;
            };
            let principal = describe(directory, &entry.principal);
            Some(PermissionEntry {
                id: entry.id.to_string(),
                principal_type: entry.principal.principal_type,
                principal_id: entry.principal.principal_id,
                principal_name: principal.name,
                role,
                granted_by: entry.granted_by,
                granted_at: entry.granted_at.to_rfc3339(),
                inherited_from: entry.inherited_from,
                source: principal.source,
            })
        })
        .collect();

    ResourcePermissionsResponse {
        resource_type: resource.resource_type,
        resource_id: resource.resource_id.clone(),
        permissions,
    }
}

/// Apply a bulk ACL change on behalf of `actor`.
///
/// The actor needs `SHARE`. Grants are applied first, then public access,
/// then revocations.
pub fn update_resource_permissions(
    store: &AclStore,
    directory: &Directory,
    actor: &AuthUser,
    resource: &ResourceKey,
    request: &UpdateResourcePermissionsRequest,
) -> Result<UpdateResults, AclError> {
    request.validate_for(resource.resource_type)?;
    require_permission(store, directory, actor, resource, PermissionBits::SHARE)?;

    let mut applied = Vec::with_capacity(request.updated.len());
    for principal in &request.updated {
        let Some(role) = principal.access_role_id else {
            continue;
        };
        store.grant(PrincipalKey::from(principal), resource.clone(), role, &actor.id)?;
        applied.push(principal.clone());
    }

    let public_access_role_id = match (request.public, request.public_access_role_id) {
        (true, Some(role)) => {
            store.grant(PrincipalKey::public(), resource.clone(), role, &actor.id)?;
            Some(role)
        }
        _ => {
            store.revoke(&PrincipalKey::public(), resource);
            None
        }
    };

    for principal in &request.removed {
        store.revoke(&PrincipalKey::from(principal), resource);
    }

    tracing::info!(
        actor = %actor.id,
        resource_type = %resource.resource_type,
        resource_id = %resource.resource_id,
        granted = applied.len(),
        revoked = request.removed.len(),
        public = request.public,
        "Resource permissions updated"
    );

    Ok(UpdateResults {
        principals: applied,
        public: public_access_role_id.is_some(),
        public_access_role_id,
    })
}

/// Make `actor` the owner of a resource nobody has access to yet.
pub fn claim_ownership(
    store: &AclStore,
    actor: &AuthUser,
    resource: &ResourceKey,
) -> Result<AclEntry, AclError> {
    store.grant_if_unowned(
        PrincipalKey::user(actor.id.clone()),
        resource.clone(),
        owner_role(resource.resource_type),
        &actor.id,
    )
}
