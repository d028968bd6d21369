//! Permission model
//!
//! Two layers:
//! - Resource ACLs: [`PermissionBits`] granted to principals through
//!   [`AccessRole`]s.
//! - Feature permissions: per system role flags in [`RolePermissions`].

pub mod bits;
pub mod principal;
pub mod roles;
pub mod system;

pub use bits::{
    has_permissions, perm_bits_to_access_level, AccessLevel, PermissionBits, PermissionCheck,
    RoleBits,
};
pub use principal::{
    AvailableRolesResponse, EffectivePermissionsResponse, GetResourcePermissionsResponse,
    PermissionEntry, Principal, PrincipalModel, PrincipalSearchParams, PrincipalSearchResponse,
    PrincipalSearchResult, PrincipalSource, PrincipalType, ResourcePermissionsResponse,
    SearchablePrincipalType, SourceCounts, UpdateResourcePermissionsRequest,
    UpdateResourcePermissionsResponse, UpdateResults,
};
pub use roles::{
    access_role_to_perm_bits, default_roles, role_for_permissions, AccessRole, AccessRoleId,
    ResourceType,
};
pub use system::{check_access, Permission, PermissionType, RolePermissions, SystemRole};
