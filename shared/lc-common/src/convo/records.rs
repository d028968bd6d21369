//! Records that hang off conversations: tags, shared links and banners.

use serde::{Deserialize, Serialize};

/// A user-defined bookmark tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ConversationTag {
    #[serde(rename = "_id")]
    pub id: String,
    pub user: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    /// Number of conversations carrying this tag.
    pub count: u64,
    /// Sort position in the tag list.
    pub position: i64,
}

/// A read-only public link to a conversation snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SharedLink {
    pub conversation_id: String,
    pub share_id: String,
    pub messages: Vec<String>,
    pub is_public: bool,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A site-wide notice shown between two instants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub banner_id: String,
    pub message: String,
    pub display_from: String,
    pub display_to: String,
    pub created_at: String,
    pub updated_at: String,
    pub is_public: bool,
}

impl Banner {
    /// Whether the banner is showing at `now`.
    ///
    /// Timestamps that fail to parse as RFC 3339 hide the banner.
    #[must_use]
    pub fn is_active_at(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        let parse = |s: &str| chrono::DateTime::parse_from_rfc3339(s).ok();
        match (parse(&self.display_from), parse(&self.display_to)) {
            (Some(from), Some(to)) => from <= now && now <= to,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_tag_uses_mongo_style_id() {
        let tag: ConversationTag = serde_json::from_value(json!({
            "_id": "t1",
            "user": "u1",
            "tag": "work",
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z",
            "count": 3,
            "position": 0
        }))
        .unwrap();
        assert_eq!(tag.id, "t1");
        assert_eq!(serde_json::to_value(&tag).unwrap()["_id"], "t1");
    }

    #[test]
    fn test_shared_link_requires_all_fields() {
        let res: Result<SharedLink, _> = serde_json::from_value(json!({
            "conversationId": "c1",
            "shareId": "s1",
            "messages": [],
            "title": "t",
            "createdAt": "x",
            "updatedAt": "x"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn test_banner_window() {
        let banner = Banner {
            banner_id: "b1".into(),
            message: "Maintenance tonight".into(),
            display_from: "2025-03-01T00:00:00Z".into(),
            display_to: "2025-03-02T00:00:00Z".into(),
            created_at: "2025-02-01T00:00:00Z".into(),
            updated_at: "2025-02-01T00:00:00Z".into(),
            is_public: true,
        };
        let inside = chrono::Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let after = chrono::Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
        assert!(banner.is_active_at(inside));
        assert!(!banner.is_active_at(after));
    }
}
