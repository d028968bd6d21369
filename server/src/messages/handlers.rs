//! Message HTTP Handlers

use axum::extract::Query;
use axum::Json;
use lc_common::error::ValidationIssue;
use lc_common::feedback::{feedback_tags, tags_for_rating, FeedbackTag, MinimalFeedback};
use lc_common::message::{build_tree, Message, MessageTree};
use serde_json::Value;

use crate::api::extract::JsonBody;

use super::error::MessageError;
use super::types::{FeedbackTagsQuery, FeedbackValidationResponse};

/// Check a feedback payload before it is stored on a message.
///
/// POST /api/messages/feedback/validate
#[utoipa::path(
    post,
    path = "/api/messages/feedback/validate",
    tag = "messages",
    request_body = MinimalFeedback,
    responses(
        (status = 200, body = FeedbackValidationResponse),
        (status = 400, description = "Invalid rating, tag or text"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(body))]
pub async fn validate_feedback(
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<FeedbackValidationResponse>, MessageError> {
    let feedback = MinimalFeedback::parse(&body)?;
    let consistent = feedback.is_consistent();
    if !consistent {
        tracing::debug!(
            rating = feedback.rating.as_str(),
            tag = feedback.tag.as_str(),
            "Feedback tag does not match rating"
        );
    }
    Ok(Json(FeedbackValidationResponse {
        feedback,
        consistent,
    }))
}

/// The feedback tag catalogue.
///
/// GET /api/messages/feedback/tags
#[utoipa::path(
    get,
    path = "/api/messages/feedback/tags",
    tag = "messages",
    params(FeedbackTagsQuery),
    responses((status = 200, body = Vec<FeedbackTag>)),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument]
pub async fn list_feedback_tags(Query(query): Query<FeedbackTagsQuery>) -> Json<Vec<FeedbackTag>> {
    Json(query.rating.map_or_else(feedback_tags, tags_for_rating))
}

/// Link a conversation's messages into reply trees.
///
/// POST /api/messages/tree
#[utoipa::path(
    post,
    path = "/api/messages/tree",
    tag = "messages",
    request_body = Vec<Message>,
    responses(
        (status = 200, description = "Messages depth first with reply ids", body = MessageTree),
        (status = 400, description = "A message failed validation"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(body), fields(count = body.len()))]
pub async fn build_message_tree(
    JsonBody(body): JsonBody<Vec<Value>>,
) -> Result<Json<MessageTree>, MessageError> {
    let mut messages = Vec::with_capacity(body.len());
    let mut issues = Vec::new();
    for (i, raw) in body.into_iter().enumerate() {
        match Message::parse(raw) {
            Ok(message) => messages.push(message),
            Err(e) if e.issues().is_empty() => {
                issues.push(ValidationIssue::at(i.to_string(), e.to_string()));
            }
            Err(e) => issues.extend(e.issues().iter().map(|issue| {
                let mut path = vec![i.to_string()];
                path.extend(issue.path.iter().cloned());
                ValidationIssue {
                    path,
                    message: issue.message.clone(),
                }
            })),
        }
    }
    if !issues.is_empty() {
        return Err(lc_common::Error::Validation(issues).into());
    }
    Ok(Json(build_tree(messages)))
}
