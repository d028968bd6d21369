//! In-memory principal directory.
//!
//! Holds the users and groups that ACL entries refer to, and the feature
//! permissions of each system role.

use std::path::Path;

use anyhow::Context;
use dashmap::DashMap;
use lc_common::permissions::{PrincipalSource, RolePermissions, SystemRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::PrincipalError;

const fn default_role() -> SystemRole {
    SystemRole::User
}

fn default_provider() -> String {
    "local".to_string()
}

/// A user known to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_role")]
    pub role: SystemRole,
    /// Id in the external identity provider.
    #[serde(default)]
    pub id_on_the_source: Option<String>,
}

impl DirectoryUser {
    /// A local user with only an id and a name.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: SystemRole) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            email: None,
            username: None,
            avatar: None,
            provider: default_provider(),
            role,
            id_on_the_source: None,
        }
    }

    /// Value stored in `memberIds` of the groups this user belongs to.
    #[must_use]
    pub fn member_key(&self) -> &str {
        self.id_on_the_source.as_deref().unwrap_or(&self.id)
    }
}

/// A group of users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    /// Member keys, see [`DirectoryUser::member_key`].
    #[serde(default)]
    pub member_ids: Vec<String>,
    #[serde(default)]
    pub source: PrincipalSource,
    #[serde(default)]
    pub id_on_the_source: Option<String>,
}

impl DirectoryGroup {
    #[must_use]
    pub fn has_member(&self, member_key: &str) -> bool {
        self.member_ids.iter().any(|m| m == member_key)
    }
}

/// Seed file contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub users: Vec<DirectoryUser>,
    #[serde(default)]
    pub groups: Vec<DirectoryGroup>,
}

impl DirectorySeed {
    /// Read a seed from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read directory seed {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid directory seed {}", path.display()))
    }
}

/// A group as reported by Microsoft Entra ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntraGroup {
    /// Entra object id.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Group ids touched by an Entra sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub added_groups: Vec<String>,
    pub removed_groups: Vec<String>,
}

/// Users, groups and role permissions.
#[derive(Debug)]
pub struct Directory {
    users: DashMap<String, DirectoryUser>,
    groups: DashMap<String, DirectoryGroup>,
    role_permissions: DashMap<SystemRole, RolePermissions>,
}

impl Default for Directory {
    fn default() -> Self {
        Self::new()
    }
}

impl Directory {
    /// An empty directory with the default role permissions.
    #[must_use]
    pub fn new() -> Self {
        let role_permissions = DashMap::new();
        for &role in SystemRole::all() {
            role_permissions.insert(role, RolePermissions::defaults_for(role));
        }
        Self {
            users: DashMap::new(),
            groups: DashMap::new(),
            role_permissions,
        }
    }

    #[must_use]
    pub fn from_seed(seed: DirectorySeed) -> Self {
        let directory = Self::new();
        for user in seed.users {
            directory.upsert_user(user);
        }
        for group in seed.groups {
            directory.upsert_group(group);
        }
        directory
    }

    pub fn upsert_user(&self, user: DirectoryUser) {
        self.users.insert(user.id.clone(), user);
    }

    #[must_use]
    pub fn user(&self, id: &str) -> Option<DirectoryUser> {
        self.users.get(id).map(|u| u.clone())
    }

    pub fn upsert_group(&self, group: DirectoryGroup) {
        self.groups.insert(group.id.clone(), group);
    }

    #[must_use]
    pub fn group(&self, id: &str) -> Option<DirectoryGroup> {
        self.groups.get(id).map(|g| g.clone())
    }

    /// Groups whose members include `member_key`, ordered by id.
    #[must_use]
    pub fn groups_for_member(&self, member_key: &str) -> Vec<DirectoryGroup> {
        let mut groups: Vec<DirectoryGroup> = self
            .groups
            .iter()
            .filter(|g| g.has_member(member_key))
            .map(|g| g.clone())
            .collect();
        groups.sort_by(|a, b| a.id.cmp(&b.id));
        groups
    }

    #[must_use]
    pub fn role_permissions(&self, role: SystemRole) -> RolePermissions {
        self.role_permissions
            .get(&role)
            .map(|p| p.clone())
            .unwrap_or_else(|| RolePermissions::defaults_for(role))
    }

    pub fn set_role_permissions(&self, role: SystemRole, permissions: RolePermissions) {
        self.role_permissions.insert(role, permissions);
    }

    /// Users whose name, email or username contains `needle`.
    ///
    /// `needle` must already be lowercase. Results are ordered by id and
    /// capped at `limit`.
    #[must_use]
    pub fn users_matching(&self, needle: &str, limit: usize) -> Vec<DirectoryUser> {
        let mut users: Vec<DirectoryUser> = self
            .users
            .iter()
            .filter(|u| {
                [&u.name, &u.email, &u.username]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(needle))
            })
            .map(|u| u.clone())
            .collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        users.truncate(limit);
        users
    }

    /// Groups whose name, email or description contains `needle`.
    #[must_use]
    pub fn groups_matching(&self, needle: &str, limit: usize) -> Vec<DirectoryGroup> {
        let mut groups: Vec<DirectoryGroup> = self
            .groups
            .iter()
            .filter(|g| {
                g.name.to_lowercase().contains(needle)
                    || [&g.email, &g.description]
                        .into_iter()
                        .flatten()
                        .any(|field| field.to_lowercase().contains(needle))
            })
            .map(|g| g.clone())
            .collect();
        groups.sort_by(|a, b| a.id.cmp(&b.id));
        groups.truncate(limit);
        groups
    }

    fn entra_group_by_external_id(&self, external_id: &str) -> Option<String> {
        self.groups
            .iter()
            .find(|g| {
                g.source == PrincipalSource::Entra
                    && g.id_on_the_source.as_deref() == Some(external_id)
            })
            .map(|g| g.id.clone())
    }

    /// Bring a user's Entra group memberships in line with `entra_groups`.
    ///
    /// Unknown groups are created, the user is added to every listed group
    /// and removed from Entra groups that are no longer listed. Local groups
    /// are left alone.
    pub fn sync_entra_groups(
        &self,
        user_id: &str,
        entra_groups: &[EntraGroup],
    ) -> Result<SyncReport, PrincipalError> {
        let user = self
            .user(user_id)
            .ok_or_else(|| PrincipalError::UserNotFound(user_id.to_string()))?;
        let member_key = user.member_key().to_string();
        let mut report = SyncReport::default();

        for entra in entra_groups {
            match self.entra_group_by_external_id(&entra.id) {
                None => {
                    let group = DirectoryGroup {
                        id: Uuid::new_v4().to_string(),
                        name: entra.name.clone(),
                        description: entra.description.clone(),
                        email: entra.email.clone(),
                        avatar: None,
                        member_ids: vec![member_key.clone()],
                        source: PrincipalSource::Entra,
                        id_on_the_source: Some(entra.id.clone()),
                    };
                    report.added_groups.push(group.id.clone());
                    self.upsert_group(group);
                }
                Some(group_id) => {
                    if let Some(mut group) = self.groups.get_mut(&group_id) {
                        if !group.has_member(&member_key) {
                            group.member_ids.push(member_key.clone());
                            report.added_groups.push(group_id);
                        }
                    }
                }
            }
        }

        for mut group in self.groups.iter_mut() {
            let listed = group
                .id_on_the_source
                .as_deref()
                .is_some_and(|ext| entra_groups.iter().any(|e| e.id == ext));
            if group.source == PrincipalSource::Entra
                && group.id_on_the_source.is_some()
                && !listed
                && group.has_member(&member_key)
            {
                group.member_ids.retain(|m| m != &member_key);
                report.removed_groups.push(group.id.clone());
            }
        }
        report.removed_groups.sort();

        tracing::info!(
            user_id,
            added = report.added_groups.len(),
            removed = report.removed_groups.len(),
            "Synced Entra group memberships"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_group(id: &str, name: &str, members: &[&str]) -> DirectoryGroup {
        DirectoryGroup {
            id: id.into(),
            name: name.into(),
            description: None,
            email: None,
            avatar: None,
            member_ids: members.iter().map(|m| (*m).to_string()).collect(),
            source: PrincipalSource::Local,
            id_on_the_source: None,
        }
    }

    fn entra(id: &str, name: &str) -> EntraGroup {
        EntraGroup {
            id: id.into(),
            name: name.into(),
            description: None,
            email: None,
        }
    }

    #[test]
    fn test_seed_parses_with_defaults() {
        let seed: DirectorySeed = serde_json::from_str(
            r#"{
                "users": [{ "id": "u1", "name": "Ada", "role": "ADMIN" }, { "id": "u2" }],
                "groups": [{ "id": "g1", "name": "Eng", "memberIds": ["u1"] }]
            }"#,
        )
        .unwrap();
        let directory = Directory::from_seed(seed);

        let ada = directory.user("u1").unwrap();
        assert_eq!(ada.role, SystemRole::Admin);
        assert_eq!(ada.provider, "local");
        assert_eq!(directory.user("u2").unwrap().role, SystemRole::User);
        assert_eq!(directory.groups_for_member("u1").len(), 1);
        assert_eq!(
            directory.group("g1").unwrap().source,
            PrincipalSource::Local
        );
    }

    #[test]
    fn test_member_key_prefers_external_id() {
        let mut user = DirectoryUser::new("u1", "Ada", SystemRole::User);
        assert_eq!(user.member_key(), "u1");
        user.id_on_the_source = Some("ext-1".into());
        assert_eq!(user.member_key(), "ext-1");
    }

    #[test]
    fn test_matching_is_case_insensitive_and_capped() {
        let directory = Directory::new();
        for i in 0..5 {
            directory.upsert_user(DirectoryUser::new(
                format!("u{i}"),
                format!("Alice {i}"),
                SystemRole::User,
            ));
        }
        directory.upsert_user(DirectoryUser::new("b", "Bob", SystemRole::User));

        let hits = directory.users_matching("alice", 3);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].id, "u0");
        assert!(directory.users_matching("zed", 10).is_empty());
    }

    #[test]
    fn test_sync_entra_groups() {
        let directory = Directory::new();
        directory.upsert_user(DirectoryUser::new("u1", "Ada", SystemRole::User));
        directory.upsert_group(local_group("local", "Local", &["u1"]));

        let report = directory
            .sync_entra_groups("u1", &[entra("e1", "Eng"), entra("e2", "Ops")])
            .unwrap();
        assert_eq!(report.added_groups.len(), 2);
        assert!(report.removed_groups.is_empty());
        assert_eq!(directory.groups_for_member("u1").len(), 3);

        // Dropping e2 removes only that membership; the local group stays.
        let report = directory
            .sync_entra_groups("u1", &[entra("e1", "Eng")])
            .unwrap();
        assert!(report.added_groups.is_empty());
        assert_eq!(report.removed_groups.len(), 1);

        let names: Vec<String> = directory
            .groups_for_member("u1")
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert!(names.contains(&"Local".to_string()));
        assert!(names.contains(&"Eng".to_string()));
        assert!(!names.contains(&"Ops".to_string()));

        // Re-adding reuses the existing group.
        let report = directory
            .sync_entra_groups("u1", &[entra("e1", "Eng"), entra("e2", "Ops")])
            .unwrap();
        assert_eq!(report.added_groups.len(), 1);
        assert_eq!(directory.groups_for_member("u1").len(), 3);
    }

    #[test]
    fn test_sync_unknown_user() {
        let directory = Directory::new();
        assert!(matches!(
            directory.sync_entra_groups("ghost", &[]),
            Err(PrincipalError::UserNotFound(_))
        ));
    }
}
