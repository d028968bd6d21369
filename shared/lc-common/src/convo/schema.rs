//! Conversation and preset shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use super::coerce;
use crate::endpoints::{ImageDetail, ModelEndpoint, ReasoningEffort, ReasoningSummary, Verbosity};
use crate::error::Result;

/// Title given to conversations that have none yet.
pub const DEFAULT_TITLE: &str = "New Chat";

fn default_title() -> Option<String> {
    Some(DEFAULT_TITLE.to_string())
}

/// Present but possibly null. Unlike a plain `Option`, a missing key is an
/// error.
fn required_nullable<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

/// Credential a plugin asks the user for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginAuthConfig {
    pub auth_field: String,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    pub name: String,
    pub plugin_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_config: Option<Vec<PluginAuthConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_menu: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_button: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolkit: Option<bool>,
}

/// A tool is either a full plugin description or just its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tool {
    Plugin(Plugin),
    Key(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleContent {
    pub content: String,
}

/// Few-shot example pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub input: ExampleContent,
    pub output: ExampleContent,
}

fn default_agent() -> String {
    "functions".to_string()
}

const fn default_agent_temperature() -> f64 {
    0.0
}

/// Agent settings of the legacy plugins endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentOptions {
    #[serde(default = "default_agent")]
    pub agent: String,
    #[serde(default)]
    pub skip_completion: bool,
    pub model: String,
    #[serde(default = "default_agent_temperature")]
    pub temperature: f64,
}

/// Every per-conversation option. All fields are optional.
///
/// Several providers spell the same knob differently (`topP` versus
/// `top_p`), so both spellings exist as separate fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_type: Option<ModelEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Google, Anthropic and Bedrock spelling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<f64>,
    /// OpenAI spelling.
    #[serde(default, rename = "top_p", skip_serializing_if = "Option::is_none")]
    pub openai_top_p: Option<f64>,
    #[serde(default, rename = "frequency_penalty", skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(default, rename = "presence_penalty", skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "coerce::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_output_tokens: Option<i64>,
    #[serde(
        default,
        deserialize_with = "coerce::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_context_tokens: Option<i64>,
    #[serde(
        default,
        rename = "max_tokens",
        deserialize_with = "coerce::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_tokens: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_cache: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<bool>,
    #[serde(
        default,
        deserialize_with = "coerce::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub thinking_budget: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<Example>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resend_files: Option<bool>,
    #[serde(default, rename = "file_ids", skip_serializing_if = "Option::is_none")]
    pub file_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_detail: Option<ImageDetail>,
    #[serde(default, rename = "reasoning_effort", skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,
    #[serde(default, rename = "reasoning_summary", skip_serializing_if = "Option::is_none")]
    pub reasoning_summary: Option<ReasoningSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<Verbosity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_responses_api: Option<bool>,
    #[serde(default, rename = "web_search", skip_serializing_if = "Option::is_none")]
    pub web_search: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_streaming: Option<bool>,
    #[serde(default, rename = "assistant_id", skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,
    #[serde(default, rename = "agent_id", skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Bedrock output limit.
    #[serde(
        default,
        rename = "maxTokens",
        deserialize_with = "coerce::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub bedrock_max_tokens: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_model_request_fields: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(
        default,
        rename = "additional_instructions",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_instructions: Option<String>,
    #[serde(
        default,
        rename = "append_current_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub append_current_datetime: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset_override: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
    #[serde(default, rename = "iconURL", skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<String>,
    #[serde(
        default,
        deserialize_with = "coerce::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub file_token_limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resend_images: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_options: Option<AgentOptions>,
    /// Legacy spelling of `modelLabel`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_gpt_label: Option<String>,
}

impl ConversationFields {
    /// Serialize into a JSON object keyed by wire names.
    pub fn to_map(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(map))?)
    }

    /// True when no option is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A stored conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(deserialize_with = "required_nullable")]
    pub conversation_id: Option<String>,
    /// Built-in endpoint name or the name of a custom endpoint.
    #[serde(deserialize_with = "required_nullable")]
    pub endpoint: Option<String>,
    /// Absent titles become "New Chat"; an explicit null stays null.
    #[serde(default = "default_title")]
    pub title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(flatten)]
    pub fields: ConversationFields,
}

impl Conversation {
    /// Decode a conversation from untrusted JSON.
    pub fn parse(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// The endpoint as a built-in variant, if it is one.
    #[must_use]
    pub fn model_endpoint(&self) -> Option<ModelEndpoint> {
        self.endpoint.as_deref().and_then(ModelEndpoint::parse)
    }
}

/// Longest preset title accepted, in characters.
pub const MAX_PRESET_TITLE: u64 = 200;

/// A saved bundle of conversation options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200, message = "Preset title must be at most 200 characters"))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_preset: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub fields: ConversationFields,
}

impl Preset {
    /// Decode and validate a preset from untrusted JSON.
    pub fn parse(value: Value) -> Result<Self> {
        let preset: Self = serde_json::from_value(value)?;
        preset.validate()?;
        Ok(preset)
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        self.default_preset.unwrap_or(false)
    }
}
