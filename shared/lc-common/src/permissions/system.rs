//! Role-based feature permissions.
//!
//! These gate whole features (prompts, agents, the people picker) per system
//! role, and are distinct from the per-resource ACL bits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Built-in system roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum SystemRole {
    Admin,
    User,
}

impl SystemRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }

    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Admin, Self::User]
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|r| r.as_str() == s)
    }
}

impl std::fmt::Display for SystemRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feature areas gated by role permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionType {
    Prompts,
    Bookmarks,
    Agents,
    Memories,
    MultiConvo,
    TemporaryChat,
    RunCode,
    WebSearch,
    PeoplePicker,
    Marketplace,
    FileSearch,
    FileCitations,
}

/// Individual capabilities within a feature area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    SharedGlobal,
    Use,
    Create,
    Update,
    Read,
    ReadAuthor,
    Share,
    OptOut,
    ViewUsers,
    ViewGroups,
    ViewRoles,
}

impl PermissionType {
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Prompts,
            Self::Bookmarks,
            Self::Agents,
            Self::Memories,
            Self::MultiConvo,
            Self::TemporaryChat,
            Self::RunCode,
            Self::WebSearch,
            Self::PeoplePicker,
            Self::Marketplace,
            Self::FileSearch,
            Self::FileCitations,
        ]
    }

    /// Capabilities that exist for this feature area.
    #[must_use]
    pub const fn permissions(self) -> &'static [Permission] {
        use Permission as P;
        match self {
            Self::Prompts | Self::Agents => &[P::SharedGlobal, P::Use, P::Create],
            Self::Memories => &[P::Use, P::Create, P::Update, P::Read, P::OptOut],
            Self::PeoplePicker => &[P::ViewUsers, P::ViewGroups, P::ViewRoles],
            Self::Bookmarks
            | Self::MultiConvo
            | Self::TemporaryChat
            | Self::RunCode
            | Self::WebSearch
            | Self::Marketplace
            | Self::FileSearch
            | Self::FileCitations => &[P::Use],
        }
    }
}

/// Flag set of one feature area.
pub type PermissionFlags = BTreeMap<Permission, bool>;

/// Feature permissions held by a role, keyed by feature area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RolePermissions(pub BTreeMap<PermissionType, PermissionFlags>);

impl RolePermissions {
    /// Every flag of every feature area set to `value`.
    #[must_use]
    pub fn uniform(value: bool) -> Self {
        Self(
            PermissionType::all()
                .iter()
                .map(|&kind| {
                    let flags = kind.permissions().iter().map(|&p| (p, value)).collect();
                    (kind, flags)
                })
                .collect(),
        )
    }

    /// Default permissions seeded for a system role.
    #[must_use]
    pub fn defaults_for(role: SystemRole) -> Self {
        let mut perms = Self::uniform(true);
        if role == SystemRole::User {
            perms.set(PermissionType::Prompts, Permission::SharedGlobal, false);
            perms.set(PermissionType::Agents, Permission::SharedGlobal, false);
            perms.set(PermissionType::PeoplePicker, Permission::ViewUsers, false);
            perms.set(PermissionType::PeoplePicker, Permission::ViewGroups, false);
            perms.set(PermissionType::PeoplePicker, Permission::ViewRoles, false);
            perms.set(PermissionType::Marketplace, Permission::Use, false);
        }
        perms
    }

    pub fn set(&mut self, kind: PermissionType, permission: Permission, value: bool) {
        self.0.entry(kind).or_default().insert(permission, value);
    }

    #[must_use]
    pub fn get(&self, kind: PermissionType, permission: Permission) -> bool {
        self.0
            .get(&kind)
            .and_then(|flags| flags.get(&permission))
            .copied()
            .unwrap_or(false)
    }
}

/// Check that every listed permission is granted for a feature area.
///
/// An empty list is always satisfied.
#[must_use]
pub fn check_access(
    role_permissions: &RolePermissions,
    permission_type: PermissionType,
    permissions: &[Permission],
) -> bool {
    permissions
        .iter()
        .all(|&p| role_permissions.get(permission_type, p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_has_everything() {
        let admin = RolePermissions::defaults_for(SystemRole::Admin);
        for &kind in PermissionType::all() {
            assert!(check_access(&admin, kind, kind.permissions()), "{kind:?}");
        }
    }

    #[test]
    fn test_user_defaults() {
        let user = RolePermissions::defaults_for(SystemRole::User);
        assert!(!user.get(PermissionType::Prompts, Permission::SharedGlobal));
        assert!(user.get(PermissionType::Prompts, Permission::Create));
        assert!(!user.get(PermissionType::Agents, Permission::SharedGlobal));
        assert!(user.get(PermissionType::Agents, Permission::Use));
        assert!(!check_access(
            &user,
            PermissionType::PeoplePicker,
            &[Permission::ViewUsers]
        ));
        assert!(!user.get(PermissionType::Marketplace, Permission::Use));
        assert!(user.get(PermissionType::Memories, Permission::OptOut));
    }

    #[test]
    fn test_check_access_requires_all() {
        let mut perms = RolePermissions::uniform(false);
        perms.set(PermissionType::Prompts, Permission::Use, true);
        assert!(check_access(&perms, PermissionType::Prompts, &[Permission::Use]));
        assert!(!check_access(
            &perms,
            PermissionType::Prompts,
            &[Permission::Use, Permission::Create]
        ));
        assert!(check_access(&perms, PermissionType::Prompts, &[]));
    }

    #[test]
    fn test_unknown_permission_for_type_is_denied() {
        let admin = RolePermissions::defaults_for(SystemRole::Admin);
        assert!(!admin.get(PermissionType::Bookmarks, Permission::ViewUsers));
    }

    #[test]
    fn test_wire_format() {
        let user = RolePermissions::defaults_for(SystemRole::User);
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["PEOPLE_PICKER"]["VIEW_GROUPS"], false);
        assert_eq!(json["MULTI_CONVO"]["USE"], true);
        assert_eq!(serde_json::to_value(SystemRole::Admin).unwrap(), "ADMIN");
    }
}
