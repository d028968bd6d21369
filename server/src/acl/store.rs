//! In-memory ACL entry store.
//!
//! One entry per `(principal, resource)` pair, grouped by resource.
//! Granting upserts, revoking deletes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lc_common::permissions::{AccessRoleId, PermissionBits, Principal, PrincipalType, ResourceType};
use uuid::Uuid;

use super::error::AclError;

/// Grantee half of an entry key. Public principals carry no id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrincipalKey {
    pub principal_type: PrincipalType,
    pub principal_id: Option<String>,
}

impl PrincipalKey {
    #[must_use]
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            principal_type: PrincipalType::User,
            principal_id: Some(id.into()),
        }
    }

    #[must_use]
    pub fn group(id: impl Into<String>) -> Self {
        Self {
            principal_type: PrincipalType::Group,
            principal_id: Some(id.into()),
        }
    }

    #[must_use]
    pub fn role(name: impl Into<String>) -> Self {
        Self {
            principal_type: PrincipalType::Role,
            principal_id: Some(name.into()),
        }
    }

    #[must_use]
    pub const fn public() -> Self {
        Self {
            principal_type: PrincipalType::Public,
            principal_id: None,
        }
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        self.principal_type == PrincipalType::Public
    }
}

impl From<&Principal> for PrincipalKey {
    fn from(principal: &Principal) -> Self {
        match principal.principal_type {
            PrincipalType::Public => Self::public(),
            principal_type => Self {
                principal_type,
                principal_id: principal.id.clone(),
            },
        }
    }
}

/// Resource half of an entry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub resource_type: ResourceType,
    pub resource_id: String,
}

impl ResourceKey {
    #[must_use]
    pub fn new(resource_type: ResourceType, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type,
            resource_id: resource_id.into(),
        }
    }
}

/// A single grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclEntry {
    pub id: Uuid,
    pub principal: PrincipalKey,
    pub resource: ResourceKey,
    pub perm_bits: PermissionBits,
    pub role_id: Option<AccessRoleId>,
    pub inherited_from: Option<String>,
    pub granted_by: String,
    pub granted_at: DateTime<Utc>,
}

/// Concurrent map of ACL entries, grouped by resource.
///
/// Writes to one resource hold that resource's shard lock, so a check and the
/// insert that depends on it happen atomically.
#[derive(Debug, Default)]
pub struct AclStore {
    entries: DashMap<ResourceKey, HashMap<PrincipalKey, AclEntry>>,
}

fn check_role(role: AccessRoleId, resource: &ResourceKey) -> Result<(), AclError> {
    if role.resource_type() == resource.resource_type {
        Ok(())
    } else {
        Err(AclError::RoleMismatch {
            role,
            resource_type: resource.resource_type,
        })
    }
}

/// Upsert into one resource's entries. The entry keeps its id when it
/// already existed.
fn upsert(
    rows: &mut HashMap<PrincipalKey, AclEntry>,
    principal: PrincipalKey,
    resource: ResourceKey,
    perm_bits: PermissionBits,
    role_id: Option<AccessRoleId>,
    granted_by: &str,
) -> AclEntry {
    let id = rows.get(&principal).map_or_else(Uuid::new_v4, |existing| existing.id);
    let entry = AclEntry {
        id,
        principal: principal.clone(),
        resource,
        perm_bits,
        role_id,
        inherited_from: None,
        granted_by: granted_by.to_string(),
        granted_at: Utc::now(),
    };
    rows.insert(principal, entry.clone());
    tracing::debug!(
        principal_type = %entry.principal.principal_type,
        principal_id = entry.principal.principal_id.as_deref().unwrap_or("-"),
        resource_id = %entry.resource.resource_id,
        perm_bits = entry.perm_bits.bits(),
        "ACL entry granted"
    );
    entry
}

impl AclStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `role` to `principal` on `resource`, replacing any existing
    /// entry for the pair.
    pub fn grant(
        &self,
        principal: PrincipalKey,
        resource: ResourceKey,
        role: AccessRoleId,
        granted_by: &str,
    ) -> Result<AclEntry, AclError> {
        check_role(role, &resource)?;
        Ok(self.grant_bits(principal, resource, role.perm_bits(), Some(role), granted_by))
    }

    /// Grant `role` only while `resource` has no entries at all.
    pub fn grant_if_unowned(
        &self,
        principal: PrincipalKey,
        resource: ResourceKey,
        role: AccessRoleId,
        granted_by: &str,
    ) -> Result<AclEntry, AclError> {
        check_role(role, &resource)?;
        match self.entries.entry(resource.clone()) {
            Entry::Occupied(rows) if !rows.get().is_empty() => Err(AclError::AlreadyOwned),
            slot => {
                let mut rows = slot.or_default();
                Ok(upsert(
                    &mut rows,
                    principal,
                    resource,
                    role.perm_bits(),
                    Some(role),
                    granted_by,
                ))
            }
        }
    }

    /// Grant raw bits, replacing any existing entry for the pair.
    ///
    /// The entry keeps its id when it already existed.
    pub fn grant_bits(
        &self,
        principal: PrincipalKey,
        resource: ResourceKey,
        perm_bits: PermissionBits,
        role_id: Option<AccessRoleId>,
        granted_by: &str,
    ) -> AclEntry {
        let mut rows = self.entries.entry(resource.clone()).or_default();
        upsert(&mut rows, principal, resource, perm_bits, role_id, granted_by)
    }

    /// Remove the entry for the pair. Returns whether one existed.
    pub fn revoke(&self, principal: &PrincipalKey, resource: &ResourceKey) -> bool {
        let removed = self
            .entries
            .get_mut(resource)
            .is_some_and(|mut rows| rows.remove(principal).is_some());
        self.entries.remove_if(resource, |_, rows| rows.is_empty());
        removed
    }

    #[must_use]
    pub fn entry(&self, principal: &PrincipalKey, resource: &ResourceKey) -> Option<AclEntry> {
        self.entries
            .get(resource)
            .and_then(|rows| rows.get(principal).cloned())
    }

    /// Every entry on a resource, oldest grant first.
    #[must_use]
    pub fn entries_for_resource(&self, resource: &ResourceKey) -> Vec<AclEntry> {
        let mut entries: Vec<AclEntry> = self
            .entries
            .get(resource)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default();
        entries.sort_by(|a, b| {
            a.granted_at
                .cmp(&b.granted_at)
                .then_with(|| a.principal.cmp(&b.principal))
        });
        entries
    }

    #[must_use]
    pub fn has_entries(&self, resource: &ResourceKey) -> bool {
        self.entries
            .get(resource)
            .is_some_and(|rows| !rows.is_empty())
    }

    /// Union of the bits granted to any of `principals` on `resource`.
    #[must_use]
    pub fn effective_permissions(
        &self,
        principals: &[PrincipalKey],
        resource: &ResourceKey,
    ) -> PermissionBits {
        let Some(rows) = self.entries.get(resource) else {
            return PermissionBits::empty();
        };
        principals
            .iter()
            .filter_map(|p| rows.get(p))
            .fold(PermissionBits::empty(), |acc, e| acc | e.perm_bits)
    }

    /// Whether a single entry of one of `principals` holds all of `required`.
    ///
    /// Bits are not combined across entries.
    #[must_use]
    pub fn has_permission(
        &self,
        principals: &[PrincipalKey],
        resource: &ResourceKey,
        required: PermissionBits,
    ) -> bool {
        self.entries.get(resource).is_some_and(|rows| {
            principals
                .iter()
                .any(|p| rows.get(p).is_some_and(|e| e.perm_bits.has(required)))
        })
    }

    /// Set `add` and then clear `remove` on an existing entry.
    ///
    /// Returns the updated entry, or `None` when there is no entry.
    pub fn modify_permission_bits(
        &self,
        principal: &PrincipalKey,
        resource: &ResourceKey,
        add: PermissionBits,
        remove: PermissionBits,
    ) -> Option<AclEntry> {
        let mut rows = self.entries.get_mut(resource)?;
        let entry = rows.get_mut(principal)?;
        entry.perm_bits = (entry.perm_bits | add) - remove;
        Some(entry.clone())
    }

    /// Ids of resources of `resource_type` where some entry of `principals`
    /// holds `required`, sorted.
    #[must_use]
    pub fn find_accessible_resources(
        &self,
        principals: &[PrincipalKey],
        resource_type: ResourceType,
        required: PermissionBits,
    ) -> Vec<String> {
        let mut ids: Vec<String> = self
            .entries
            .iter()
            .filter(|rows| {
                rows.key().resource_type == resource_type
                    && principals
                        .iter()
                        .any(|p| rows.get(p).is_some_and(|e| e.perm_bits.has(required)))
            })
            .map(|rows| rows.key().resource_id.clone())
            .collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lc_common::permissions::RoleBits;

    fn agent(id: &str) -> ResourceKey {
        ResourceKey::new(ResourceType::Agent, id)
    }

    #[test]
    fn test_grant_upserts() {
        let store = AclStore::new();
        let first = store
            .grant(PrincipalKey::user("u1"), agent("a1"), AccessRoleId::AgentViewer, "owner")
            .unwrap();
        let second = store
            .grant(PrincipalKey::user("u1"), agent("a1"), AccessRoleId::AgentEditor, "owner")
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.entries_for_resource(&agent("a1")).len(), 1);
        assert_eq!(second.perm_bits, RoleBits::EDITOR);
        assert_eq!(second.role_id, Some(AccessRoleId::AgentEditor));
    }

    #[test]
    fn test_grant_rejects_foreign_role() {
        let store = AclStore::new();
        let result = store.grant(
            PrincipalKey::user("u1"),
            agent("a1"),
            AccessRoleId::PromptGroupOwner,
            "owner",
        );
        assert!(matches!(result, Err(AclError::RoleMismatch { .. })));
        assert!(!store.has_entries(&agent("a1")));
    }

    #[test]
    fn test_effective_permissions_is_union() {
        let store = AclStore::new();
        store.grant_bits(PrincipalKey::user("u1"), agent("a1"), PermissionBits::VIEW, None, "x");
        store.grant_bits(PrincipalKey::group("g1"), agent("a1"), PermissionBits::EDIT, None, "x");
        store.grant_bits(PrincipalKey::user("u2"), agent("a1"), PermissionBits::SHARE, None, "x");

        let principals = [
            PrincipalKey::user("u1"),
            PrincipalKey::group("g1"),
            PrincipalKey::public(),
        ];
        let bits = store.effective_permissions(&principals, &agent("a1"));
        assert_eq!(bits, PermissionBits::VIEW | PermissionBits::EDIT);
        assert_eq!(
            store.effective_permissions(&principals, &agent("other")),
            PermissionBits::empty()
        );
    }

    #[test]
    fn test_has_permission_needs_one_entry() {
        let store = AclStore::new();
        store.grant_bits(PrincipalKey::user("u1"), agent("a1"), PermissionBits::VIEW, None, "x");
        store.grant_bits(PrincipalKey::group("g1"), agent("a1"), PermissionBits::EDIT, None, "x");
        let principals = [PrincipalKey::user("u1"), PrincipalKey::group("g1")];

        assert!(store.has_permission(&principals, &agent("a1"), PermissionBits::VIEW));
        assert!(!store.has_permission(
            &principals,
            &agent("a1"),
            PermissionBits::VIEW | PermissionBits::EDIT
        ));
    }

    #[test]
    fn test_modify_permission_bits() {
        let store = AclStore::new();
        let user = PrincipalKey::user("u1");
        assert!(store
            .modify_permission_bits(
                &user,
                &agent("a1"),
                PermissionBits::EDIT,
                PermissionBits::empty()
            )
            .is_none());

        store.grant_bits(user.clone(), agent("a1"), RoleBits::VIEWER, None, "x");
        let updated = store
            .modify_permission_bits(
                &user,
                &agent("a1"),
                PermissionBits::EDIT | PermissionBits::DELETE,
                PermissionBits::VIEW,
            )
            .unwrap();
        assert_eq!(updated.perm_bits, PermissionBits::EDIT | PermissionBits::DELETE);
    }

    #[test]
    fn test_revoke_and_find_accessible() {
        let store = AclStore::new();
        let user = PrincipalKey::user("u1");
        store.grant_bits(user.clone(), agent("b"), RoleBits::VIEWER, None, "x");
        store.grant_bits(user.clone(), agent("a"), RoleBits::OWNER, None, "x");
        store.grant_bits(PrincipalKey::public(), agent("a"), RoleBits::VIEWER, None, "x");
        store.grant_bits(
            user.clone(),
            ResourceKey::new(ResourceType::PromptGroup, "p"),
            RoleBits::OWNER,
            None,
            "x",
        );

        let principals = [user.clone(), PrincipalKey::public()];
        assert_eq!(
            store.find_accessible_resources(&principals, ResourceType::Agent, PermissionBits::VIEW),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(
            store.find_accessible_resources(&principals, ResourceType::Agent, PermissionBits::EDIT),
            vec!["a".to_string()]
        );

        assert!(store.revoke(&user, &agent("a")));
        assert!(!store.revoke(&user, &agent("a")));
        assert!(store.entry(&PrincipalKey::public(), &agent("a")).is_some());
    }

    #[test]
    fn test_grant_if_unowned_once() {
        let store = AclStore::new();
        store
            .grant_if_unowned(PrincipalKey::user("u1"), agent("a1"), AccessRoleId::AgentOwner, "u1")
            .unwrap();
        let second = store.grant_if_unowned(
            PrincipalKey::user("u2"),
            agent("a1"),
            AccessRoleId::AgentOwner,
            "u2",
        );
        assert!(matches!(second, Err(AclError::AlreadyOwned)));

        // An emptied resource can be claimed again.
        assert!(store.revoke(&PrincipalKey::user("u1"), &agent("a1")));
        assert!(!store.has_entries(&agent("a1")));
        assert!(store
            .grant_if_unowned(PrincipalKey::user("u2"), agent("a1"), AccessRoleId::AgentOwner, "u2")
            .is_ok());
    }

    #[test]
    fn test_concurrent_claims_single_owner() {
        let store = AclStore::new();
        let claimed = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|i| {
                    let store = &store;
                    scope.spawn(move || {
                        let user = format!("u{i}");
                        store
                            .grant_if_unowned(
                                PrincipalKey::user(user.clone()),
                                agent("contested"),
                                AccessRoleId::AgentOwner,
                                &user,
                            )
                            .is_ok()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|ok| *ok)
                .count()
        });

        assert_eq!(claimed, 1);
        assert_eq!(store.entries_for_resource(&agent("contested")).len(), 1);
    }

    #[test]
    fn test_public_key_ignores_id() {
        let mut principal = Principal::public();
        principal.id = Some("ignored".into());
        assert_eq!(PrincipalKey::from(&principal), PrincipalKey::public());
    }
}
