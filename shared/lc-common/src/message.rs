//! Chat messages and the reply tree.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::convo::DEFAULT_TITLE;
use crate::error::{Error, Result, ValidationIssue};
use crate::feedback::MinimalFeedback;

fn default_title() -> Option<String> {
    Some(DEFAULT_TITLE.to_string())
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn required_nullable<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub conversation_id: Option<String>,
    /// `None` for the first message of a conversation.
    #[serde(deserialize_with = "required_nullable")]
    pub parent_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_parent_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default = "default_title")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<String>,
    pub is_created_by_user: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<String>,
    #[serde(default = "now_rfc3339")]
    pub created_at: String,
    #[serde(default = "now_rfc3339")]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unfinished: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_result: Option<bool>,
    #[serde(default, rename = "finish_reason", skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default, rename = "thread_id", skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, rename = "iconURL", skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<MinimalFeedback>,
}

impl Message {
    /// Decode a message, validating any attached feedback.
    pub fn parse(mut value: Value) -> Result<Self> {
        let feedback = value
            .as_object_mut()
            .and_then(|o| o.remove("feedback"))
            .filter(|f| !f.is_null());

        let mut message: Self = serde_json::from_value(value)?;
        if let Some(raw) = feedback {
            let parsed = MinimalFeedback::parse(&raw).map_err(|e| {
                Error::Validation(
                    e.issues()
                        .iter()
                        .map(|issue| {
                            let mut path = vec!["feedback".to_string()];
                            path.extend(issue.path.iter().cloned());
                            ValidationIssue {
                                path,
                                message: issue.message.clone(),
                            }
                        })
                        .collect(),
                )
            })?;
            message.feedback = Some(parsed);
        }
        Ok(message)
    }
}

/// A message with the ids of its direct replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessageNode {
    #[serde(flatten)]
    pub message: Message,
    /// `messageId`s of direct replies, in input order.
    pub children: Vec<String>,
    /// Distance from the root, starting at 0.
    pub depth: usize,
}

/// A reply forest stored flat.
///
/// Nodes are listed depth first with every parent ahead of its replies, so
/// arbitrarily long threads never need nested values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessageTree {
    /// `messageId`s of the top-level messages.
    pub roots: Vec<String>,
    pub nodes: Vec<MessageNode>,
}

impl MessageTree {
    /// Look up a node by `messageId`.
    #[must_use]
    pub fn node(&self, message_id: &str) -> Option<&MessageNode> {
        self.nodes.iter().find(|n| n.message.message_id == message_id)
    }
}

/// Link messages into a forest by `parentMessageId`.
///
/// Siblings keep their input order. A message whose parent is not in the
/// list becomes a root.
#[must_use]
pub fn build_tree(messages: Vec<Message>) -> MessageTree {
    let index: HashMap<&str, usize> = messages
        .iter()
        .enumerate()
        .map(|(i, m)| (m.message_id.as_str(), i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); messages.len()];
    let mut roots = Vec::new();
    for (i, message) in messages.iter().enumerate() {
        match message
            .parent_message_id
            .as_deref()
            .and_then(|p| index.get(p))
        {
            Some(&parent) if parent != i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    let mut walk = Walk {
        children: &children,
        visited: vec![false; messages.len()],
        placed: vec![Vec::new(); messages.len()],
        order: Vec::with_capacity(messages.len()),
    };
    let mut top = Vec::new();
    for root in roots {
        if walk.visit(root) {
            top.push(root);
        }
    }
    // Parent cycles never reach a root; surface them at the top level.
    for i in 0..messages.len() {
        if walk.visit(i) {
            top.push(i);
        }
    }

    let ids: Vec<String> = messages.iter().map(|m| m.message_id.clone()).collect();
    let mut slots: Vec<Option<Message>> = messages.into_iter().map(Some).collect();
    let nodes = walk
        .order
        .iter()
        .filter_map(|&(at, depth)| {
            Some(MessageNode {
                message: slots[at].take()?,
                children: walk.placed[at].iter().map(|&c| ids[c].clone()).collect(),
                depth,
            })
        })
        .collect();

    MessageTree {
        roots: top.into_iter().map(|i| ids[i].clone()).collect(),
        nodes,
    }
}

/// Depth-first traversal state with an explicit stack.
struct Walk<'a> {
    children: &'a [Vec<usize>],
    visited: Vec<bool>,
    /// Replies actually attached under each message.
    placed: Vec<Vec<usize>>,
    /// Pre-order of `(message, depth)`.
    order: Vec<(usize, usize)>,
}

impl Walk<'_> {
    /// Walk the subtree under `start`. Returns `false` if it was already placed.
    fn visit(&mut self, start: usize) -> bool {
        if self.visited[start] {
            return false;
        }
        self.visited[start] = true;
        let mut stack = vec![(start, 0)];
        while let Some((at, depth)) = stack.pop() {
            self.order.push((at, depth));
            for &child in self.children[at].iter().rev() {
                if !self.visited[child] {
                    self.visited[child] = true;
                    self.placed[at].push(child);
                    stack.push((child, depth + 1));
                }
            }
            self.placed[at].reverse();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn msg(id: &str, parent: Option<&str>) -> Message {
        Message::parse(json!({
            "messageId": id,
            "conversationId": "c1",
            "parentMessageId": parent,
            "text": id,
            "isCreatedByUser": parent.is_none(),
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_are_filled() {
        let m = msg("m1", None);
        assert_eq!(m.title.as_deref(), Some(DEFAULT_TITLE));
        assert!(chrono::DateTime::parse_from_rfc3339(&m.created_at).is_ok());
        assert!(chrono::DateTime::parse_from_rfc3339(&m.updated_at).is_ok());
    }

    #[test]
    fn test_required_fields() {
        let missing_parent = Message::parse(json!({
            "messageId": "m1",
            "conversationId": null,
            "text": "",
            "isCreatedByUser": true
        }));
        assert!(missing_parent.is_err());
    }

    #[test]
    fn test_feedback_is_validated_with_path() {
        let err = Message::parse(json!({
            "messageId": "m1",
            "conversationId": "c1",
            "parentMessageId": null,
            "text": "hi",
            "isCreatedByUser": false,
            "feedback": { "rating": "thumbsUp", "tag": "nope" }
        }))
        .unwrap_err();
        assert_eq!(err.issues()[0].path, vec!["feedback", "tag"]);
    }

    #[test]
    fn test_build_tree_links_children_in_order() {
        let tree = build_tree(vec![
            msg("root", None),
            msg("a", Some("root")),
            msg("b", Some("root")),
            msg("a1", Some("a")),
        ]);
        assert_eq!(tree.roots, vec!["root"]);
        let root = tree.node("root").unwrap();
        assert_eq!(root.depth, 0);
        assert_eq!(root.children, vec!["a", "b"]);
        assert_eq!(tree.node("a").unwrap().children, vec!["a1"]);
        assert_eq!(tree.node("a1").unwrap().depth, 2);

        let order: Vec<&str> = tree
            .nodes
            .iter()
            .map(|n| n.message.message_id.as_str())
            .collect();
        assert_eq!(order, vec!["root", "a", "a1", "b"]);
    }

    #[test]
    fn test_orphans_become_roots() {
        let tree = build_tree(vec![msg("x", Some("missing")), msg("y", None)]);
        assert_eq!(tree.roots, vec!["x", "y"]);
        assert_eq!(tree.nodes.len(), 2);
    }

    #[test]
    fn test_parent_cycle_is_not_lost() {
        let tree = build_tree(vec![msg("p", Some("q")), msg("q", Some("p"))]);
        assert_eq!(tree.roots, vec!["p"]);
        assert_eq!(tree.node("p").unwrap().children, vec!["q"]);
        assert!(tree.node("q").unwrap().children.is_empty());
    }

    #[test]
    fn test_child_listed_before_parent() {
        let tree = build_tree(vec![msg("child", Some("parent")), msg("parent", None)]);
        assert_eq!(tree.roots, vec!["parent"]);
        assert_eq!(tree.node("parent").unwrap().children, vec!["child"]);
    }

    #[test]
    fn test_long_thread_on_small_stack() {
        const LEN: usize = 20_000;
        let messages: Vec<Message> = (0..LEN)
            .map(|i| {
                let parent = i.checked_sub(1).map(|p| format!("m{p}"));
                msg(&format!("m{i}"), parent.as_deref())
            })
            .collect();

        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(move || {
                let tree = build_tree(messages);
                let json = serde_json::to_string(&tree).unwrap();
                (tree.roots.len(), tree.nodes.len(), tree.nodes[LEN - 1].depth, json.len())
            })
            .unwrap();
        let (roots, nodes, last_depth, json_len) = handle.join().unwrap();

        assert_eq!(roots, 1);
        assert_eq!(nodes, LEN);
        assert_eq!(last_depth, LEN - 1);
        assert!(json_len > 0);
    }
}
