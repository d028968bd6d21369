//! Principals and ACL wire shapes.
//!
//! A principal is the subject of a grant: a user, a group, a system role, or
//! the public (everyone).

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::roles::{AccessRole, AccessRoleId, ResourceType};
use crate::error::{Error, Result, ValidationIssue};

/// Kind of principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum PrincipalType {
    User,
    Group,
    Public,
    Role,
}

impl PrincipalType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
            Self::Public => "public",
            Self::Role => "role",
        }
    }

    /// Reference model of a non-public principal.
    #[must_use]
    pub const fn model(self) -> Option<PrincipalModel> {
        match self {
            Self::User => Some(PrincipalModel::User),
            Self::Group => Some(PrincipalModel::Group),
            Self::Role => Some(PrincipalModel::Role),
            Self::Public => None,
        }
    }
}

impl std::fmt::Display for PrincipalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model name a principal id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum PrincipalModel {
    User,
    Group,
    Role,
}

/// Where a principal is managed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum PrincipalSource {
    /// Managed by this application.
    #[default]
    Local,
    /// Synced from Microsoft Entra ID.
    Entra,
}

/// Principal types that can be searched. `public` is not searchable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SearchablePrincipalType {
    User,
    Group,
    Role,
}

impl From<SearchablePrincipalType> for PrincipalType {
    fn from(value: SearchablePrincipalType) -> Self {
        match value {
            SearchablePrincipalType::User => Self::User,
            SearchablePrincipalType::Group => Self::Group,
            SearchablePrincipalType::Role => Self::Role,
        }
    }
}

impl TryFrom<PrincipalType> for SearchablePrincipalType {
    type Error = Error;

    fn try_from(value: PrincipalType) -> Result<Self> {
        match value {
            PrincipalType::User => Ok(Self::User),
            PrincipalType::Group => Ok(Self::Group),
            PrincipalType::Role => Ok(Self::Role),
            PrincipalType::Public => Err(Error::invalid(
                "type",
                "Invalid enum value. Expected 'user' | 'group' | 'role', received 'public'",
            )),
        }
    }
}

impl std::str::FromStr for SearchablePrincipalType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(Self::User),
            "group" => Ok(Self::Group),
            "role" => Ok(Self::Role),
            other => Err(Error::invalid(
                "type",
                format!(
                    "Invalid enum value. Expected 'user' | 'group' | 'role', received '{other}'"
                ),
            )),
        }
    }
}

/// Identifies a grantee, with optional display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    #[serde(rename = "type")]
    pub principal_type: PrincipalType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PrincipalSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_on_the_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_role_id: Option<AccessRoleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u64>,
}

impl Principal {
    /// A bare principal of the given type and id.
    #[must_use]
    pub fn new(principal_type: PrincipalType, id: Option<String>) -> Self {
        Self {
            principal_type,
            id,
            name: None,
            email: None,
            source: None,
            avatar: None,
            description: None,
            id_on_the_source: None,
            access_role_id: None,
            member_count: None,
        }
    }

    #[must_use]
    pub fn user(id: impl Into<String>) -> Self {
        Self::new(PrincipalType::User, Some(id.into()))
    }

    #[must_use]
    pub fn group(id: impl Into<String>) -> Self {
        Self::new(PrincipalType::Group, Some(id.into()))
    }

    #[must_use]
    pub fn role(name: impl Into<String>) -> Self {
        Self::new(PrincipalType::Role, Some(name.into()))
    }

    #[must_use]
    pub fn public() -> Self {
        Self::new(PrincipalType::Public, None)
    }

    /// Non-public principals must carry an id; public ones must not.
    pub fn check_id(&self) -> Result<()> {
        match (self.principal_type, self.id.as_deref()) {
            (PrincipalType::Public, _) => Ok(()),
            (_, Some(id)) if !id.trim().is_empty() => Ok(()),
            (kind, _) => Err(Error::invalid("id", format!("A {kind} principal requires an id"))),
        }
    }
}

/// One ACL row as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PermissionEntry {
    pub id: String,
    pub principal_type: PrincipalType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_name: Option<String>,
    pub role: AccessRole,
    pub granted_by: String,
    /// RFC 3339 timestamp.
    pub granted_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PrincipalSource>,
}

/// Every ACL row of one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ResourcePermissionsResponse {
    pub resource_type: ResourceType,
    pub resource_id: String,
    pub permissions: Vec<PermissionEntry>,
}

/// Bulk ACL change for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourcePermissionsRequest {
    /// Principals to grant, each with an `accessRoleId`.
    #[serde(default)]
    pub updated: Vec<Principal>,
    /// Principals to revoke.
    #[serde(default)]
    pub removed: Vec<Principal>,
    /// Whether everyone gets access.
    pub public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_access_role_id: Option<AccessRoleId>,
}

impl UpdateResourcePermissionsRequest {
    /// Check the request against the resource it targets.
    ///
    /// Every granted principal needs a role for `resource_type`, and public
    /// access needs a public role.
    pub fn validate_for(&self, resource_type: ResourceType) -> Result<()> {
        let mut issues = Vec::new();
        for (i, principal) in self.updated.iter().enumerate() {
            let path = |field: &str| vec!["updated".to_string(), i.to_string(), field.to_string()];
            if principal.principal_type == PrincipalType::Public {
                issues.push(ValidationIssue {
                    path: path("type"),
                    message: "Use the public flag to grant public access".into(),
                });
                continue;
            }
            if let Err(e) = principal.check_id() {
                issues.extend(e.issues().iter().map(|issue| ValidationIssue {
                    path: path("id"),
                    message: issue.message.clone(),
                }));
            }
            match principal.access_role_id {
                None => issues.push(ValidationIssue {
                    path: path("accessRoleId"),
                    message: "Required".into(),
                }),
                Some(role) if role.resource_type() != resource_type => {
                    issues.push(ValidationIssue {
                        path: path("accessRoleId"),
                        message: format!("Role {role} does not apply to {resource_type}"),
                    });
                }
                Some(_) => {}
            }
        }
        for (i, principal) in self.removed.iter().enumerate() {
            if let Err(e) = principal.check_id() {
                issues.extend(e.issues().iter().map(|issue| ValidationIssue {
                    path: vec!["removed".to_string(), i.to_string(), "id".to_string()],
                    message: issue.message.clone(),
                }));
            }
        }
        if self.public {
            match self.public_access_role_id {
                None => issues.push(ValidationIssue::at(
                    "publicAccessRoleId",
                    "Required when public is true",
                )),
                Some(role) if role.resource_type() != resource_type => {
                    issues.push(ValidationIssue::at(
                        "publicAccessRoleId",
                        format!("Role {role} does not apply to {resource_type}"),
                    ));
                }
                Some(_) => {}
            }
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(issues))
        }
    }
}

/// What an ACL update applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateResults {
    pub principals: Vec<Principal>,
    pub public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_access_role_id: Option<AccessRoleId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateResourcePermissionsResponse {
    pub message: String,
    pub results: UpdateResults,
}

/// Principals with access to a resource, grouped the way the share dialog
/// shows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct GetResourcePermissionsResponse {
    pub resource_type: ResourceType,
    pub resource_id: String,
    pub principals: Vec<Principal>,
    pub public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_access_role_id: Option<AccessRoleId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EffectivePermissionsResponse {
    pub permission_bits: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AvailableRolesResponse {
    pub resource_type: ResourceType,
    pub roles: Vec<AccessRole>,
}

/// Query string of a principal search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema, utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct PrincipalSearchParams {
    #[validate(length(min = 1, max = 200, message = "Query must be 1-200 characters"))]
    pub q: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub principal_type: Option<SearchablePrincipalType>,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PrincipalSearchResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub principal_type: SearchablePrincipalType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub source: PrincipalSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_on_the_source: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SourceCounts {
    pub local: usize,
    pub entra: usize,
}

impl SourceCounts {
    #[must_use]
    pub fn tally(results: &[PrincipalSearchResult]) -> Self {
        results.iter().fold(Self::default(), |mut acc, r| {
            match r.source {
                PrincipalSource::Local => acc.local += 1,
                PrincipalSource::Entra => acc.entra += 1,
            }
            acc
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PrincipalSearchResponse {
    pub query: String,
    pub limit: u32,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub principal_type: Option<SearchablePrincipalType>,
    pub results: Vec<PrincipalSearchResult>,
    pub count: usize,
    pub sources: SourceCounts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_principal_wire_format() {
        let mut principal = Principal::user("u1");
        principal.access_role_id = Some(AccessRoleId::AgentEditor);
        principal.id_on_the_source = Some("ext-1".into());
        let json = serde_json::to_value(&principal).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "user",
                "id": "u1",
                "idOnTheSource": "ext-1",
                "accessRoleId": "agent_editor"
            })
        );
    }

    #[test]
    fn test_public_principal_has_no_id() {
        let json = serde_json::to_value(Principal::public()).unwrap();
        assert_eq!(json, json!({ "type": "public" }));
        assert!(Principal::public().check_id().is_ok());
        assert!(Principal::new(PrincipalType::Group, None).check_id().is_err());
    }

    #[test]
    fn test_search_type_rejects_public() {
        assert!("public".parse::<SearchablePrincipalType>().is_err());
        assert!(SearchablePrincipalType::try_from(PrincipalType::Public).is_err());
        assert_eq!(
            "group".parse::<SearchablePrincipalType>().unwrap(),
            SearchablePrincipalType::Group
        );
        let parsed: std::result::Result<PrincipalSearchParams, _> =
            serde_json::from_value(json!({ "q": "al", "type": "public" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_search_params_validation() {
        let params = PrincipalSearchParams {
            q: String::new(),
            limit: None,
            principal_type: None,
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_update_request_requires_matching_roles() {
        let mut alice = Principal::user("alice");
        alice.access_role_id = Some(AccessRoleId::PromptGroupViewer);
        let request = UpdateResourcePermissionsRequest {
            updated: vec![alice, Principal::group("g1")],
            removed: vec![],
            public: true,
            public_access_role_id: None,
        };
        let err = request.validate_for(ResourceType::Agent).unwrap_err();
        let paths: Vec<String> = err.issues().iter().map(|i| i.path.join(".")).collect();
        assert_eq!(
            paths,
            vec![
                "updated.0.accessRoleId",
                "updated.1.accessRoleId",
                "publicAccessRoleId"
            ]
        );
    }

    #[test]
    fn test_update_request_accepts_valid_payload() {
        let request: UpdateResourcePermissionsRequest = serde_json::from_value(json!({
            "updated": [{ "type": "user", "id": "u1", "accessRoleId": "agent_owner" }],
            "removed": [{ "type": "group", "id": "g1" }],
            "public": true,
            "publicAccessRoleId": "agent_viewer"
        }))
        .unwrap();
        request.validate_for(ResourceType::Agent).unwrap();
    }

    #[test]
    fn test_source_counts() {
        let hit = |source| PrincipalSearchResult {
            id: Some("x".into()),
            principal_type: SearchablePrincipalType::User,
            name: "x".into(),
            email: None,
            username: None,
            avatar: None,
            provider: None,
            source,
            member_count: None,
            description: None,
            id_on_the_source: None,
        };
        let counts = SourceCounts::tally(&[
            hit(PrincipalSource::Local),
            hit(PrincipalSource::Entra),
            hit(PrincipalSource::Local),
        ]);
        assert_eq!(counts, SourceCounts { local: 2, entra: 1 });
    }

    #[test]
    fn test_permission_entry_round_trip_shape() {
        let entry: PermissionEntry = serde_json::from_value(json!({
            "id": "e1",
            "principalType": "role",
            "principalId": "ADMIN",
            "role": { "accessRoleId": "agent_viewer", "name": "com_ui_role_viewer", "permBits": 1 },
            "grantedBy": "u1",
            "grantedAt": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(entry.principal_type, PrincipalType::Role);
        assert_eq!(entry.role.resource_type, ResourceType::Agent);
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("inheritedFrom").is_none());
    }
}
