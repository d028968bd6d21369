//! Conversation request and response types.

use lc_common::convo::PossibleValues;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

/// Body of a conversation parse.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParseConvoRequest {
    #[validate(length(min = 1, message = "Endpoint is required"))]
    pub endpoint: String,
    /// Schema used when `endpoint` is a custom endpoint name.
    #[serde(default)]
    pub endpoint_type: Option<String>,
    #[schema(value_type = Object)]
    pub conversation: Value,
    #[serde(default)]
    pub possible_values: Option<PossibleValues>,
    /// Parse the compact option set, dropping defaults.
    #[serde(default)]
    pub compact: bool,
}

/// Endpoint options kept by the parser.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParseConvoResponse {
    pub endpoint: String,
    #[schema(value_type = Object)]
    pub conversation: Map<String, Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SenderResponse {
    pub sender: String,
}
