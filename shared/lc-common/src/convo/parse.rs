//! Per-endpoint option parsing.
//!
//! Each endpoint accepts a fixed subset of [`ConversationFields`]. Parsing
//! picks that subset from a conversation or preset, drops nullish values and
//! decodes the rest. A subset that fails to decode yields no options at all.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::schema::ConversationFields;
use crate::endpoints::{
    ModelEndpoint, AGENTS_SETTINGS, ANTHROPIC_SETTINGS, BEDROCK_SETTINGS, GOOGLE_SETTINGS,
    OPENAI_SETTINGS,
};

/// Drop null entries, and empty strings too when asked.
#[must_use]
pub fn remove_nullish_values(
    mut map: Map<String, Value>,
    remove_empty_strings: bool,
) -> Map<String, Value> {
    map.retain(|_, v| match v {
        Value::Null => false,
        Value::String(s) => !(remove_empty_strings && s.is_empty()),
        _ => true,
    });
    map
}

// ============================================================================
// Field sets
// ============================================================================

const OPENAI_FIELDS: &[&str] = &[
    "model",
    "temperature",
    "iconURL",
    "modelLabel",
    "promptPrefix",
    "top_p",
    "frequency_penalty",
    "presence_penalty",
    "maxContextTokens",
    "max_tokens",
    "artifacts",
    "resendFiles",
    "imageDetail",
    "reasoning_effort",
    "reasoning_summary",
    "verbosity",
    "useResponsesApi",
    "web_search",
    "disableStreaming",
    "stop",
    "greeting",
    "spec",
    "fileTokenLimit",
    "chatGptLabel",
];

const GOOGLE_FIELDS: &[&str] = &[
    "model",
    "temperature",
    "iconURL",
    "modelLabel",
    "promptPrefix",
    "topP",
    "topK",
    "maxOutputTokens",
    "maxContextTokens",
    "thinking",
    "thinkingBudget",
    "artifacts",
    "examples",
    "web_search",
    "greeting",
    "spec",
    "fileTokenLimit",
];

const ANTHROPIC_FIELDS: &[&str] = &[
    "model",
    "temperature",
    "iconURL",
    "modelLabel",
    "promptPrefix",
    "topP",
    "topK",
    "maxOutputTokens",
    "maxContextTokens",
    "promptCache",
    "thinking",
    "thinkingBudget",
    "stream",
    "artifacts",
    "resendFiles",
    "web_search",
    "stop",
    "greeting",
    "spec",
    "fileTokenLimit",
];

const AGENTS_FIELDS: &[&str] = &[
    "model",
    "temperature",
    "iconURL",
    "modelLabel",
    "promptPrefix",
    "top_p",
    "frequency_penalty",
    "presence_penalty",
    "maxContextTokens",
    "resendFiles",
    "imageDetail",
    "agent_id",
    "instructions",
    "greeting",
];

const COMPACT_AGENTS_FIELDS: &[&str] = &[
    "iconURL",
    "agent_id",
    "instructions",
    "additional_instructions",
    "greeting",
    "spec",
];

const ASSISTANTS_FIELDS: &[&str] = &[
    "model",
    "iconURL",
    "promptPrefix",
    "artifacts",
    "assistant_id",
    "instructions",
    "append_current_datetime",
    "greeting",
    "spec",
];

const COMPACT_ASSISTANTS_FIELDS: &[&str] = &[
    "model",
    "iconURL",
    "promptPrefix",
    "artifacts",
    "assistant_id",
    "instructions",
    "greeting",
    "spec",
];

const BEDROCK_FIELDS: &[&str] = &[
    "modelLabel",
    "model",
    "promptPrefix",
    "temperature",
    "topP",
    "topK",
    "maxOutputTokens",
    "maxContextTokens",
    "system",
    "thinking",
    "thinkingBudget",
    "artifacts",
    "resendFiles",
    "region",
    "maxTokens",
    "additionalModelRequestFields",
    "stop",
    "greeting",
    "spec",
    "iconURL",
];

const PLUGINS_FIELDS: &[&str] = &[
    "model",
    "temperature",
    "iconURL",
    "tools",
    "modelLabel",
    "promptPrefix",
    "top_p",
    "frequency_penalty",
    "presence_penalty",
    "maxContextTokens",
    "artifacts",
    "greeting",
    "spec",
    "agentOptions",
    "chatGptLabel",
];

/// Option schema of one endpoint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointSchema {
    OpenAI,
    Google,
    Anthropic,
    Agents,
    Assistants,
    Bedrock,
    GptPlugins,
}

impl EndpointSchema {
    /// Schema for a built-in endpoint. `chatGPTBrowser` has none.
    #[must_use]
    pub const fn for_endpoint(endpoint: ModelEndpoint) -> Option<Self> {
        match endpoint {
            ModelEndpoint::OpenAI | ModelEndpoint::AzureOpenAI | ModelEndpoint::Custom => {
                Some(Self::OpenAI)
            }
            ModelEndpoint::Google => Some(Self::Google),
            ModelEndpoint::Anthropic => Some(Self::Anthropic),
            ModelEndpoint::Agents => Some(Self::Agents),
            ModelEndpoint::Assistants | ModelEndpoint::AzureAssistants => Some(Self::Assistants),
            ModelEndpoint::Bedrock => Some(Self::Bedrock),
            ModelEndpoint::GptPlugins => Some(Self::GptPlugins),
            ModelEndpoint::ChatGptBrowser => None,
        }
    }

    /// Resolve the schema for an endpoint name, falling back to the declared
    /// endpoint type and then to the OpenAI-compatible schema.
    #[must_use]
    pub fn resolve(endpoint: &str, endpoint_type: Option<&str>) -> Option<Self> {
        if let Some(known) = ModelEndpoint::parse(endpoint) {
            return Self::for_endpoint(known);
        }
        match endpoint_type.and_then(ModelEndpoint::parse) {
            Some(kind) => Self::for_endpoint(kind),
            None => Some(Self::OpenAI),
        }
    }

    #[must_use]
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            Self::OpenAI => OPENAI_FIELDS,
            Self::Google => GOOGLE_FIELDS,
            Self::Anthropic => ANTHROPIC_FIELDS,
            Self::Agents => AGENTS_FIELDS,
            Self::Assistants => ASSISTANTS_FIELDS,
            Self::Bedrock => BEDROCK_FIELDS,
            Self::GptPlugins => PLUGINS_FIELDS,
        }
    }

    #[must_use]
    pub const fn compact_fields(self) -> &'static [&'static str] {
        match self {
            Self::Agents => COMPACT_AGENTS_FIELDS,
            Self::Assistants => COMPACT_ASSISTANTS_FIELDS,
            other => other.fields(),
        }
    }

    /// Values the compact form leaves out because they are the defaults.
    fn defaults(self) -> Vec<(&'static str, Value)> {
        let num = |v: f64| Value::from(v);
        match self {
            Self::OpenAI => vec![
                ("temperature", num(OPENAI_SETTINGS.temperature.default)),
                ("top_p", num(OPENAI_SETTINGS.top_p.default)),
                ("presence_penalty", num(OPENAI_SETTINGS.presence_penalty.default)),
                ("frequency_penalty", num(OPENAI_SETTINGS.frequency_penalty.default)),
                ("resendFiles", Value::Bool(OPENAI_SETTINGS.resend_files)),
                ("imageDetail", Value::from("auto")),
            ],
            Self::Google => vec![
                ("temperature", num(GOOGLE_SETTINGS.temperature.default)),
                ("maxOutputTokens", num(GOOGLE_SETTINGS.max_output_tokens.default)),
                ("topP", num(GOOGLE_SETTINGS.top_p.default)),
                ("topK", num(GOOGLE_SETTINGS.top_k.default)),
                ("thinking", Value::Bool(GOOGLE_SETTINGS.thinking)),
                ("thinkingBudget", num(GOOGLE_SETTINGS.thinking_budget.default)),
            ],
            Self::Anthropic => vec![
                ("temperature", num(ANTHROPIC_SETTINGS.temperature.default)),
                ("topP", num(ANTHROPIC_SETTINGS.top_p.default)),
                ("topK", num(ANTHROPIC_SETTINGS.top_k.default)),
                ("promptCache", Value::Bool(ANTHROPIC_SETTINGS.prompt_cache)),
                ("thinking", Value::Bool(ANTHROPIC_SETTINGS.thinking)),
                ("thinkingBudget", num(ANTHROPIC_SETTINGS.thinking_budget.default)),
                ("resendFiles", Value::Bool(ANTHROPIC_SETTINGS.resend_files)),
                ("web_search", Value::Bool(ANTHROPIC_SETTINGS.web_search)),
            ],
            Self::Agents => vec![
                ("temperature", num(AGENTS_SETTINGS.temperature.default)),
                ("top_p", num(AGENTS_SETTINGS.top_p.default)),
                ("presence_penalty", num(AGENTS_SETTINGS.presence_penalty.default)),
                ("frequency_penalty", num(AGENTS_SETTINGS.frequency_penalty.default)),
                ("resendFiles", Value::Bool(AGENTS_SETTINGS.resend_files)),
                ("imageDetail", Value::from("auto")),
            ],
            Self::Bedrock => vec![
                ("temperature", num(BEDROCK_SETTINGS.temperature.default)),
                ("resendFiles", Value::Bool(BEDROCK_SETTINGS.resend_files)),
            ],
            Self::GptPlugins => vec![
                ("temperature", num(0.8)),
                ("top_p", num(1.0)),
                ("presence_penalty", num(0.0)),
                ("frequency_penalty", num(0.0)),
            ],
            Self::Assistants => Vec::new(),
        }
    }

    /// Pick this schema's fields from `input` and decode them.
    ///
    /// Returns empty options when the picked subset does not decode.
    #[must_use]
    pub fn parse(self, input: &Value) -> ConversationFields {
        self.parse_with(input, self.fields(), false)
    }

    /// Like [`Self::parse`] with the compact field set, leaving out values
    /// equal to the endpoint defaults.
    #[must_use]
    pub fn parse_compact(self, input: &Value) -> ConversationFields {
        self.parse_with(input, self.compact_fields(), true)
    }

    fn parse_with(self, input: &Value, fields: &[&str], compact: bool) -> ConversationFields {
        let Some(object) = input.as_object() else {
            tracing::debug!(schema = ?self, "Conversation payload is not an object");
            return ConversationFields::default();
        };

        let mut picked: Map<String, Value> = object
            .iter()
            .filter(|(k, _)| fields.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        picked = remove_nullish_values(picked, false);

        if compact {
            for (key, default) in self.defaults() {
                if picked.get(key).is_some_and(|v| json_eq(v, &default)) {
                    picked.remove(key);
                }
            }
        }

        let mut parsed = match ConversationFields::from_map(picked) {
            Ok(fields) => fields,
            Err(e) => {
                tracing::debug!(schema = ?self, error = %e, "Discarding undecodable options");
                return ConversationFields::default();
            }
        };

        let has_legacy_label = parsed.chat_gpt_label.as_deref().is_some_and(|l| !l.is_empty());
        if self == Self::OpenAI
            && has_legacy_label
            && parsed.model_label.as_deref().is_none_or(str::is_empty)
        {
            parsed.model_label = parsed.chat_gpt_label.take();
        }
        parsed
    }
}

/// Numbers compare by value so that `1` equals `1.0`.
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => (x - y).abs() < f64::EPSILON,
        _ => a == b,
    }
}

/// Model lists the endpoint offers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PossibleValues {
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub secondary_models: Vec<String>,
}

fn apply_possible_values(fields: &mut ConversationFields, possible: Option<&PossibleValues>) {
    let Some(possible) = possible else {
        return;
    };
    if let Some(model) = possible.models.iter().find(|m| !m.is_empty()) {
        fields.model = Some(model.clone());
    }
    if let (Some(model), Some(options)) = (
        possible.secondary_models.iter().find(|m| !m.is_empty()),
        fields.agent_options.as_mut(),
    ) {
        options.model.clone_from(model);
    }
}

/// Parse the endpoint options of a conversation or preset.
///
/// Returns `None` when the endpoint has no option schema.
#[must_use]
pub fn parse_convo(
    endpoint: &str,
    endpoint_type: Option<&str>,
    conversation: &Value,
    possible_values: Option<&PossibleValues>,
) -> Option<ConversationFields> {
    let schema = EndpointSchema::resolve(endpoint, endpoint_type)?;
    let mut fields = schema.parse(conversation);
    apply_possible_values(&mut fields, possible_values);
    Some(fields)
}

/// Parse the compact option set used for stored presets and URLs.
#[must_use]
pub fn parse_compact_convo(
    endpoint: &str,
    endpoint_type: Option<&str>,
    conversation: &Value,
    possible_values: Option<&PossibleValues>,
) -> Option<ConversationFields> {
    let schema = EndpointSchema::resolve(endpoint, endpoint_type)?;
    let mut fields = schema.parse_compact(conversation);
    apply_possible_values(&mut fields, possible_values);
    Some(fields)
}
