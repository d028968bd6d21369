//! Access roles: named permission bundles per resource type.

use serde::{Deserialize, Serialize};

use super::bits::{PermissionBits, RoleBits};
use crate::error::{Error, Result, ValidationIssue};

/// Kind of resource an ACL entry protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ResourceType {
    #[serde(rename = "agent")]
    Agent,
    #[serde(rename = "promptGroup")]
    PromptGroup,
}

impl Default for ResourceType {
    fn default() -> Self {
        Self::Agent
    }
}

impl ResourceType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::PromptGroup => "promptGroup",
        }
    }

    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Agent, Self::PromptGroup]
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::invalid("resourceType", format!("Unknown resource type '{s}'")))
    }
}

/// Identifiers of the predefined access roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum AccessRoleId {
    #[serde(rename = "agent_viewer")]
    AgentViewer,
    #[serde(rename = "agent_editor")]
    AgentEditor,
    #[serde(rename = "agent_owner")]
    AgentOwner,
    #[serde(rename = "promptGroup_viewer")]
    PromptGroupViewer,
    #[serde(rename = "promptGroup_editor")]
    PromptGroupEditor,
    #[serde(rename = "promptGroup_owner")]
    PromptGroupOwner,
}

impl AccessRoleId {
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::AgentViewer,
            Self::AgentEditor,
            Self::AgentOwner,
            Self::PromptGroupViewer,
            Self::PromptGroupEditor,
            Self::PromptGroupOwner,
        ]
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AgentViewer => "agent_viewer",
            Self::AgentEditor => "agent_editor",
            Self::AgentOwner => "agent_owner",
            Self::PromptGroupViewer => "promptGroup_viewer",
            Self::PromptGroupEditor => "promptGroup_editor",
            Self::PromptGroupOwner => "promptGroup_owner",
        }
    }

    /// Resource type this role applies to.
    #[must_use]
    pub const fn resource_type(self) -> ResourceType {
        match self {
            Self::AgentViewer | Self::AgentEditor | Self::AgentOwner => ResourceType::Agent,
            Self::PromptGroupViewer | Self::PromptGroupEditor | Self::PromptGroupOwner => {
                ResourceType::PromptGroup
            }
        }
    }

    /// Bits granted by this role.
    #[must_use]
    pub const fn perm_bits(self) -> PermissionBits {
        match self {
            Self::AgentViewer | Self::PromptGroupViewer => RoleBits::VIEWER,
            Self::AgentEditor | Self::PromptGroupEditor => RoleBits::EDITOR,
            Self::AgentOwner | Self::PromptGroupOwner => RoleBits::OWNER,
        }
    }

    /// Localization key suffix (`viewer`, `editor`, `owner`).
    const fn tier(self) -> &'static str {
        match self {
            Self::AgentViewer | Self::PromptGroupViewer => "viewer",
            Self::AgentEditor | Self::PromptGroupEditor => "editor",
            Self::AgentOwner | Self::PromptGroupOwner => "owner",
        }
    }

    /// Look up an id by its wire string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|id| id.as_str() == s)
    }
}

impl std::fmt::Display for AccessRoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named bundle of permission bits for one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AccessRole {
    pub access_role_id: AccessRoleId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub resource_type: ResourceType,
    pub perm_bits: u32,
}

impl AccessRole {
    /// Build the seeded definition of a predefined role.
    #[must_use]
    pub fn predefined(id: AccessRoleId) -> Self {
        Self {
            access_role_id: id,
            name: format!("com_ui_role_{}", id.tier()),
            description: Some(format!("com_ui_role_{}_desc", id.tier())),
            resource_type: id.resource_type(),
            perm_bits: id.perm_bits().bits(),
        }
    }

    /// Typed view of `perm_bits`.
    #[must_use]
    pub const fn bits(&self) -> PermissionBits {
        PermissionBits::from_raw(self.perm_bits)
    }

    /// Check the role invariants.
    ///
    /// `perm_bits` must be a union of known permission bits, the name must be
    /// non-empty, and the id must belong to the declared resource type.
    pub fn validate(&self) -> Result<()> {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push(ValidationIssue::at("name", "Required"));
        }
        if PermissionBits::from_bits(self.perm_bits).is_none() {
            issues.push(ValidationIssue::at(
                "permBits",
                format!("Unknown permission bits in {}", self.perm_bits),
            ));
        }
        if self.access_role_id.resource_type() != self.resource_type {
            issues.push(ValidationIssue::at(
                "resourceType",
                format!(
                    "Role {} does not apply to {}",
                    self.access_role_id, self.resource_type
                ),
            ));
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(issues))
        }
    }
}

/// The predefined roles seeded for every resource type.
#[must_use]
pub fn default_roles() -> Vec<AccessRole> {
    AccessRoleId::all()
        .iter()
        .copied()
        .map(AccessRole::predefined)
        .collect()
}

/// Map an access role id to its permission bits.
///
/// Unknown ids grant nothing.
#[must_use]
pub fn access_role_to_perm_bits(access_role_id: &str) -> u32 {
    AccessRoleId::parse(access_role_id).map_or(0, |id| id.perm_bits().bits())
}

/// Pick the role that best describes `bits` for a resource type.
///
/// An exact match wins. Otherwise the strongest role whose bits are fully
/// contained in `bits` is chosen.
#[must_use]
pub fn role_for_permissions(
    roles: &[AccessRole],
    resource_type: ResourceType,
    bits: u32,
) -> Option<&AccessRole> {
    let mut candidates: Vec<&AccessRole> = roles
        .iter()
        .filter(|r| r.resource_type == resource_type)
        .collect();

    if let Some(exact) = candidates.iter().find(|r| r.perm_bits == bits) {
        return Some(exact);
    }

    candidates.sort_by(|a, b| b.perm_bits.cmp(&a.perm_bits));
    candidates
        .into_iter()
        .find(|r| (r.perm_bits & bits) == r.perm_bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::bits::{perm_bits_to_access_level, AccessLevel};

    #[test]
    fn test_role_table_maps_to_expected_access_level() {
        let expected = [
            ("agent_viewer", AccessLevel::Viewer),
            ("agent_editor", AccessLevel::Editor),
            ("agent_owner", AccessLevel::Owner),
            ("promptGroup_viewer", AccessLevel::Viewer),
            ("promptGroup_editor", AccessLevel::Editor),
            ("promptGroup_owner", AccessLevel::Owner),
        ];
        for (id, level) in expected {
            assert_eq!(
                perm_bits_to_access_level(access_role_to_perm_bits(id)),
                level,
                "role {id}"
            );
        }
    }

    #[test]
    fn test_unknown_role_grants_nothing() {
        assert_eq!(access_role_to_perm_bits("agent_superuser"), 0);
        assert_eq!(access_role_to_perm_bits(""), 0);
    }

    #[test]
    fn test_default_roles_are_valid() {
        let roles = default_roles();
        assert_eq!(roles.len(), 6);
        for role in &roles {
            role.validate().unwrap();
        }
        let owner = roles
            .iter()
            .find(|r| r.access_role_id == AccessRoleId::PromptGroupOwner)
            .unwrap();
        assert_eq!(owner.name, "com_ui_role_owner");
        assert_eq!(owner.description.as_deref(), Some("com_ui_role_owner_desc"));
        assert_eq!(owner.resource_type, ResourceType::PromptGroup);
        assert_eq!(owner.perm_bits, 15);
    }

    #[test]
    fn test_role_wire_format() {
        let json = serde_json::to_value(AccessRole::predefined(AccessRoleId::AgentEditor)).unwrap();
        assert_eq!(json["accessRoleId"], "agent_editor");
        assert_eq!(json["resourceType"], "agent");
        assert_eq!(json["permBits"], 3);
    }

    #[test]
    fn test_resource_type_defaults_to_agent() {
        let role: AccessRole = serde_json::from_value(serde_json::json!({
            "accessRoleId": "agent_viewer",
            "name": "Viewer",
            "permBits": 1
        }))
        .unwrap();
        assert_eq!(role.resource_type, ResourceType::Agent);
    }

    #[test]
    fn test_validate_rejects_unknown_bits() {
        let mut role = AccessRole::predefined(AccessRoleId::AgentViewer);
        role.perm_bits = 16 | 1;
        let err = role.validate().unwrap_err();
        assert_eq!(err.issues()[0].path, vec!["permBits".to_string()]);
    }

    #[test]
    fn test_validate_rejects_mismatched_resource_type() {
        let mut role = AccessRole::predefined(AccessRoleId::AgentViewer);
        role.resource_type = ResourceType::PromptGroup;
        assert!(role.validate().is_err());
    }

    #[test]
    fn test_role_for_permissions_exact_and_closest() {
        let roles = default_roles();
        let exact = role_for_permissions(&roles, ResourceType::Agent, 3).unwrap();
        assert_eq!(exact.access_role_id, AccessRoleId::AgentEditor);

        // 7 (manager) has no predefined role; editor is the closest below it
        let closest = role_for_permissions(&roles, ResourceType::Agent, 7).unwrap();
        assert_eq!(closest.access_role_id, AccessRoleId::AgentEditor);

        let prompt = role_for_permissions(&roles, ResourceType::PromptGroup, 15).unwrap();
        assert_eq!(prompt.access_role_id, AccessRoleId::PromptGroupOwner);

        assert!(role_for_permissions(&roles, ResourceType::Agent, 0).is_none());
        assert!(role_for_permissions(&roles, ResourceType::Agent, 8).is_none());
    }

    #[test]
    fn test_resource_type_from_str() {
        assert_eq!("promptGroup".parse::<ResourceType>().unwrap(), ResourceType::PromptGroup);
        assert!("project".parse::<ResourceType>().is_err());
    }
}
