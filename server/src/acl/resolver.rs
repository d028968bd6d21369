//! Principal resolution.
//!
//! Expands a caller into every principal an ACL entry may name them by.

use crate::auth::AuthUser;
use crate::principals::Directory;

use super::store::PrincipalKey;

/// Principals that act for `user`.
///
/// Order: the user itself, the user's system role, each group whose members
/// include the user (by group id), then public.
#[must_use]
pub fn user_principals(directory: &Directory, user: &AuthUser) -> Vec<PrincipalKey> {
    let mut principals = vec![
        PrincipalKey::user(user.id.clone()),
        PrincipalKey::role(user.role.as_str()),
    ];

    principals.extend(
        directory
            .groups_for_member(user.member_key())
            .into_iter()
            .map(|g| PrincipalKey::group(g.id)),
    );

    principals.push(PrincipalKey::public());
    principals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principals::{DirectoryGroup, DirectoryUser};
    use lc_common::permissions::{PrincipalSource, PrincipalType, SystemRole};

    fn group(id: &str, members: &[&str]) -> DirectoryGroup {
        DirectoryGroup {
            id: id.into(),
            name: id.into(),
            description: None,
            email: None,
            avatar: None,
            member_ids: members.iter().map(|m| (*m).to_string()).collect(),
            source: PrincipalSource::Local,
            id_on_the_source: None,
        }
    }

    #[test]
    fn test_user_principals_order() {
        let directory = Directory::new();
        directory.upsert_group(group("g2", &["u1"]));
        directory.upsert_group(group("g1", &["u1", "u2"]));
        directory.upsert_group(group("g3", &["u2"]));

        let user = AuthUser::from(DirectoryUser::new("u1", "Ada", SystemRole::Admin));
        let principals = user_principals(&directory, &user);

        assert_eq!(
            principals,
            vec![
                PrincipalKey::user("u1"),
                PrincipalKey::role("ADMIN"),
                PrincipalKey::group("g1"),
                PrincipalKey::group("g2"),
                PrincipalKey::public(),
            ]
        );
    }

    #[test]
    fn test_membership_uses_external_id() {
        let directory = Directory::new();
        directory.upsert_group(group("g1", &["ext-1"]));

        let mut user = DirectoryUser::new("u1", "Ada", SystemRole::User);
        user.id_on_the_source = Some("ext-1".into());
        let principals = user_principals(&directory, &AuthUser::from(user));

        assert!(principals.contains(&PrincipalKey::group("g1")));
        assert_eq!(principals.last().map(|p| p.principal_type), Some(PrincipalType::Public));
    }
}
