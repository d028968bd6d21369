//! Conversation HTTP Handlers

use axum::Json;
use lc_common::convo::{self, parse_compact_convo, parse_convo, Conversation, EndpointOption};
use serde_json::Value;
use validator::Validate;

use crate::api::extract::JsonBody;

use super::error::ConvoError;
use super::types::{ParseConvoRequest, ParseConvoResponse, SenderResponse};

/// Keep the options the endpoint's schema knows about.
///
/// POST /api/convos/parse
#[utoipa::path(
    post,
    path = "/api/convos/parse",
    tag = "convos",
    request_body = ParseConvoRequest,
    responses(
        (status = 200, body = ParseConvoResponse),
        (status = 400, description = "Unsupported endpoint or invalid body"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(
    skip(request),
    fields(endpoint = %request.endpoint, compact = request.compact)
)]
pub async fn parse_conversation(
    JsonBody(request): JsonBody<ParseConvoRequest>,
) -> Result<Json<ParseConvoResponse>, ConvoError> {
    request.validate()?;

    let parse = if request.compact {
        parse_compact_convo
    } else {
        parse_convo
    };
    let fields = parse(
        &request.endpoint,
        request.endpoint_type.as_deref(),
        &request.conversation,
        request.possible_values.as_ref(),
    )
    .ok_or_else(|| ConvoError::UnsupportedEndpoint(request.endpoint.clone()))?;

    Ok(Json(ParseConvoResponse {
        endpoint: request.endpoint,
        conversation: fields.to_map()?,
    }))
}

/// Decode a stored conversation, filling in defaults.
///
/// POST /api/convos/validate
#[utoipa::path(
    post,
    path = "/api/convos/validate",
    tag = "convos",
    request_body = Object,
    responses(
        (status = 200, description = "Normalized conversation", body = Object),
        (status = 400, description = "Invalid conversation"),
    ),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument(skip(body))]
pub async fn validate_conversation(
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<Conversation>, ConvoError> {
    Ok(Json(Conversation::parse(body)?))
}

/// Name shown next to assistant messages.
///
/// POST /api/convos/sender
#[utoipa::path(
    post,
    path = "/api/convos/sender",
    tag = "convos",
    request_body = EndpointOption,
    responses((status = 200, body = SenderResponse)),
    security(("bearer_auth" = [])),
)]
#[tracing::instrument]
pub async fn response_sender(JsonBody(option): JsonBody<EndpointOption>) -> Json<SenderResponse> {
    Json(SenderResponse {
        sender: convo::response_sender(&option),
    })
}
