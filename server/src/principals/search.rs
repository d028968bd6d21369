//! Principal search and relevance ranking.

use std::cmp::Reverse;

use lc_common::permissions::{
    PrincipalSearchResult, PrincipalSource, SearchablePrincipalType, SystemRole,
};

use super::directory::{Directory, DirectoryGroup, DirectoryUser};

/// Score for a field equal to the pattern, ignoring case.
pub const SCORE_EXACT: u32 = 100;
/// Score for a field starting with the pattern.
pub const SCORE_PREFIX: u32 = 80;
/// Score for a field containing the pattern.
pub const SCORE_CONTAINS: u32 = 50;
/// Score for any other non-empty field.
pub const SCORE_OTHER: u32 = 10;

impl From<DirectoryUser> for PrincipalSearchResult {
    fn from(user: DirectoryUser) -> Self {
        let id_on_the_source = user.id_on_the_source.unwrap_or_else(|| user.id.clone());
        Self {
            id: Some(user.id),
            principal_type: SearchablePrincipalType::User,
            name: user
                .name
                .filter(|n| !n.is_empty())
                .or_else(|| user.email.clone())
                .unwrap_or_default(),
            email: user.email,
            username: user.username,
            avatar: user.avatar,
            provider: Some(user.provider),
            source: PrincipalSource::Local,
            member_count: None,
            description: None,
            id_on_the_source: Some(id_on_the_source),
        }
    }
}

impl From<DirectoryGroup> for PrincipalSearchResult {
    fn from(group: DirectoryGroup) -> Self {
        let id_on_the_source = group.id_on_the_source.unwrap_or_else(|| group.id.clone());
        Self {
            id: Some(group.id),
            principal_type: SearchablePrincipalType::Group,
            name: group.name,
            email: group.email,
            username: None,
            avatar: group.avatar,
            provider: None,
            source: group.source,
            member_count: Some(group.member_ids.len() as u64),
            description: group.description,
            id_on_the_source: Some(id_on_the_source),
        }
    }
}

fn role_result(role: SystemRole) -> PrincipalSearchResult {
    PrincipalSearchResult {
        id: Some(role.as_str().to_string()),
        principal_type: SearchablePrincipalType::Role,
        name: role.as_str().to_string(),
        email: None,
        username: None,
        avatar: None,
        provider: None,
        source: PrincipalSource::Local,
        member_count: None,
        description: None,
        id_on_the_source: Some(role.as_str().to_string()),
    }
}

/// Best match score of `pattern` over the searchable fields of `item`.
///
/// Users are matched on name, email and username; groups and roles on name,
/// email and description. Empty fields are skipped.
#[must_use]
pub fn relevance_score(item: &PrincipalSearchResult, pattern: &str) -> u32 {
    let pattern = pattern.to_lowercase();
    let third = match item.principal_type {
        SearchablePrincipalType::User => item.username.as_deref(),
        _ => item.description.as_deref(),
    };

    [Some(item.name.as_str()), item.email.as_deref(), third]
        .into_iter()
        .flatten()
        .filter(|field| !field.is_empty())
        .map(|field| {
            let field = field.to_lowercase();
            if field == pattern {
                SCORE_EXACT
            } else if field.starts_with(&pattern) {
                SCORE_PREFIX
            } else if field.contains(&pattern) {
                SCORE_CONTAINS
            } else {
                SCORE_OTHER
            }
        })
        .max()
        .unwrap_or(0)
}

/// Order by score descending, then users first, then by name.
pub fn sort_by_relevance(results: &mut [PrincipalSearchResult], pattern: &str) {
    results.sort_by_cached_key(|r| {
        let sort_name = if r.name.is_empty() {
            r.email.clone().unwrap_or_default()
        } else {
            r.name.clone()
        };
        (
            Reverse(relevance_score(r, pattern)),
            r.principal_type != SearchablePrincipalType::User,
            sort_name.to_lowercase(),
        )
    });
}

/// Find users, groups and roles matching `pattern`.
///
/// A blank pattern matches nothing. At most `limit_per_type` results are
/// returned for each type, unranked. `type_filter` restricts the types
/// searched; `None` searches all of them.
#[must_use]
pub fn search_principals(
    directory: &Directory,
    pattern: &str,
    limit_per_type: usize,
    type_filter: Option<&[SearchablePrincipalType]>,
) -> Vec<PrincipalSearchResult> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Vec::new();
    }
    let needle = pattern.to_lowercase();
    let wants = |kind: SearchablePrincipalType| {
        type_filter.is_none_or(|types| types.contains(&kind))
    };

    let mut results = Vec::new();
    if wants(SearchablePrincipalType::User) {
        results.extend(
            directory
                .users_matching(&needle, limit_per_type)
                .into_iter()
                .map(PrincipalSearchResult::from),
        );
    }
    if wants(SearchablePrincipalType::Group) {
        results.extend(
            directory
                .groups_matching(&needle, limit_per_type)
                .into_iter()
                .map(PrincipalSearchResult::from),
        );
    }
    if wants(SearchablePrincipalType::Role) {
        results.extend(
            SystemRole::all()
                .iter()
                .filter(|role| role.as_str().to_lowercase().contains(&needle))
                .take(limit_per_type)
                .copied()
                .map(role_result),
        );
    }
    results
}
