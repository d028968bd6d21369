//! Model endpoints and their parameter settings.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Known model endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub enum ModelEndpoint {
    #[serde(rename = "azureOpenAI")]
    AzureOpenAI,
    #[serde(rename = "openAI")]
    OpenAI,
    Google,
    Anthropic,
    Assistants,
    AzureAssistants,
    Agents,
    Custom,
    Bedrock,
    /// Deprecated.
    #[serde(rename = "chatGPTBrowser")]
    ChatGptBrowser,
    /// Deprecated.
    GptPlugins,
}

impl ModelEndpoint {
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::AzureOpenAI,
            Self::OpenAI,
            Self::Google,
            Self::Anthropic,
            Self::Assistants,
            Self::AzureAssistants,
            Self::Agents,
            Self::Custom,
            Self::Bedrock,
            Self::ChatGptBrowser,
            Self::GptPlugins,
        ]
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AzureOpenAI => "azureOpenAI",
            Self::OpenAI => "openAI",
            Self::Google => "google",
            Self::Anthropic => "anthropic",
            Self::Assistants => "assistants",
            Self::AzureAssistants => "azureAssistants",
            Self::Agents => "agents",
            Self::Custom => "custom",
            Self::Bedrock => "bedrock",
            Self::ChatGptBrowser => "chatGPTBrowser",
            Self::GptPlugins => "gptPlugins",
        }
    }

    /// Look up a built-in endpoint. Custom endpoint names return `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|e| e.as_str() == s)
    }

    /// Display name used when nothing more specific is known.
    #[must_use]
    pub const fn alternate_name(self) -> &'static str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Assistants => "Assistants",
            Self::AzureAssistants => "Azure Assistants",
            Self::AzureOpenAI => "Azure OpenAI",
            Self::ChatGptBrowser => "ChatGPT",
            Self::GptPlugins => "Plugins",
            Self::Google => "Google",
            Self::Anthropic => "Anthropic",
            Self::Custom => "Custom",
            Self::Bedrock => "AWS Bedrock",
            Self::Agents => "My Agents",
        }
    }

    #[must_use]
    pub const fn is_deprecated(self) -> bool {
        matches!(self, Self::ChatGptBrowser | Self::GptPlugins)
    }

    /// Endpoints whose conversations carry tunable model parameters.
    #[must_use]
    pub const fn is_param(self) -> bool {
        matches!(
            self,
            Self::OpenAI
                | Self::AzureOpenAI
                | Self::Anthropic
                | Self::Google
                | Self::Bedrock
                | Self::Custom
                | Self::Agents
        )
    }
}

impl std::fmt::Display for ModelEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model providers reachable through AWS Bedrock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum BedrockProvider {
    Ai21,
    Amazon,
    Anthropic,
    Cohere,
    Meta,
    Mistral,
    Stability,
    #[serde(rename = "deepseek")]
    DeepSeek,
}

/// Image resolution hint for vision models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Low,
    #[default]
    Auto,
    High,
}

impl ImageDetail {
    /// Slider position used by the settings panel (`low = 0`, `high = 2`).
    #[must_use]
    pub const fn slider_value(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Auto => 1,
            Self::High => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    #[default]
    #[serde(rename = "")]
    Unset,
    Minimal,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ReasoningSummary {
    #[default]
    #[serde(rename = "")]
    Unset,
    Auto,
    Concise,
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    #[default]
    #[serde(rename = "")]
    Unset,
    Low,
    Medium,
    High,
}

/// Assistants endpoints end in `assistants`, case-insensitively.
#[must_use]
pub fn is_assistants_endpoint(endpoint: &str) -> bool {
    endpoint.to_ascii_lowercase().ends_with("assistants")
}

#[must_use]
pub fn is_agents_endpoint(endpoint: &str) -> bool {
    endpoint == ModelEndpoint::Agents.as_str()
}

/// Whether an endpoint (or the type a custom endpoint declares) takes model
/// parameters.
#[must_use]
pub fn is_param_endpoint(endpoint: &str, endpoint_type: Option<&str>) -> bool {
    let is_param = |name: &str| ModelEndpoint::parse(name).is_some_and(ModelEndpoint::is_param);
    is_param(endpoint) || endpoint_type.is_some_and(is_param)
}

// ============================================================================
// Settings
// ============================================================================

/// Bounds and default of a numeric parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl NumericRange {
    #[must_use]
    pub const fn new(min: f64, max: f64, step: f64, default: f64) -> Self {
        Self {
            min,
            max,
            step,
            default,
        }
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

const TEMPERATURE_0_2: NumericRange = NumericRange::new(0.0, 2.0, 0.01, 1.0);
const TEMPERATURE_0_1: NumericRange = NumericRange::new(0.0, 1.0, 0.01, 1.0);
const TOP_P: NumericRange = NumericRange::new(0.0, 1.0, 0.01, 1.0);
const PENALTY: NumericRange = NumericRange::new(-2.0, 2.0, 0.01, 0.0);

/// Parameter settings for OpenAI-style endpoints (also used by agents).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenAISettings {
    pub model: &'static str,
    pub temperature: NumericRange,
    pub top_p: NumericRange,
    pub presence_penalty: NumericRange,
    pub frequency_penalty: NumericRange,
    pub resend_files: bool,
    pub image_detail: ImageDetail,
}

pub const OPENAI_SETTINGS: OpenAISettings = OpenAISettings {
    model: "gpt-4o-mini",
    temperature: TEMPERATURE_0_2,
    top_p: TOP_P,
    presence_penalty: PENALTY,
    frequency_penalty: PENALTY,
    resend_files: true,
    image_detail: ImageDetail::Auto,
};

pub const AGENTS_SETTINGS: OpenAISettings = OpenAISettings {
    model: "gpt-3.5-turbo-test",
    temperature: TEMPERATURE_0_1,
    ..OPENAI_SETTINGS
};

/// Bedrock shares the agents parameter table.
pub const BEDROCK_SETTINGS: OpenAISettings = AGENTS_SETTINGS;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoogleSettings {
    pub model: &'static str,
    pub max_output_tokens: NumericRange,
    pub temperature: NumericRange,
    pub top_p: NumericRange,
    pub top_k: NumericRange,
    pub thinking: bool,
    /// `-1` lets the model size its own thinking budget.
    pub thinking_budget: NumericRange,
}

pub const GOOGLE_SETTINGS: GoogleSettings = GoogleSettings {
    model: "gemini-1.5-flash-latest",
    max_output_tokens: NumericRange::new(1.0, 64000.0, 1.0, 8192.0),
    temperature: TEMPERATURE_0_2,
    top_p: NumericRange::new(0.0, 1.0, 0.01, 0.95),
    top_k: NumericRange::new(1.0, 40.0, 1.0, 40.0),
    thinking: true,
    thinking_budget: NumericRange::new(-1.0, 32768.0, 1.0, -1.0),
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnthropicSettings {
    pub model: &'static str,
    pub temperature: NumericRange,
    pub prompt_cache: bool,
    pub thinking: bool,
    pub thinking_budget: NumericRange,
    pub max_output_tokens: NumericRange,
    /// Output limit of pre-3.5 models.
    pub legacy_max_output_tokens: NumericRange,
    pub top_p: NumericRange,
    pub top_k: NumericRange,
    pub resend_files: bool,
    pub web_search: bool,
}

pub const ANTHROPIC_SETTINGS: AnthropicSettings = AnthropicSettings {
    model: "claude-3-5-sonnet-latest",
    temperature: TEMPERATURE_0_1,
    prompt_cache: true,
    thinking: true,
    thinking_budget: NumericRange::new(1024.0, 200_000.0, 100.0, 2000.0),
    max_output_tokens: NumericRange::new(1.0, 128_000.0, 1.0, 8192.0),
    legacy_max_output_tokens: NumericRange::new(1.0, 4096.0, 1.0, 4096.0),
    top_p: NumericRange::new(0.0, 1.0, 0.01, 0.7),
    top_k: NumericRange::new(1.0, 40.0, 1.0, 5.0),
    resend_files: true,
    web_search: false,
};

static ANTHROPIC_EXTENDED_OUTPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"claude-3[-.]?[5-9]|claude-(?:sonnet|opus|haiku)-[4-9]").expect("valid regex")
});

/// Whether a Claude model supports the extended output limit.
#[must_use]
pub fn anthropic_has_extended_output(model: &str) -> bool {
    ANTHROPIC_EXTENDED_OUTPUT.is_match(model)
}

/// Default output limit when switching to `model`.
#[must_use]
pub fn anthropic_max_output_tokens_reset(model: &str) -> u32 {
    if anthropic_has_extended_output(model) {
        8192
    } else {
        4096
    }
}

/// Apply a user-chosen output limit, capping legacy models.
#[must_use]
pub fn anthropic_max_output_tokens_set(value: u32, model: &str) -> u32 {
    let legacy_max = ANTHROPIC_SETTINGS.legacy_max_output_tokens.max as u32;
    if !anthropic_has_extended_output(model) && value > legacy_max {
        legacy_max
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_wire_names() {
        for &endpoint in ModelEndpoint::all() {
            let json = serde_json::to_value(endpoint).unwrap();
            assert_eq!(json, endpoint.as_str());
            let back: ModelEndpoint = serde_json::from_value(json).unwrap();
            assert_eq!(back, endpoint);
        }
    }

    #[test]
    fn test_param_endpoints() {
        assert!(is_param_endpoint("openAI", None));
        assert!(is_param_endpoint("bedrock", None));
        assert!(!is_param_endpoint("assistants", None));
        assert!(!is_param_endpoint("groq", None));
        assert!(is_param_endpoint("groq", Some("custom")));
        assert!(!is_param_endpoint("groq", Some("assistants")));
    }

    #[test]
    fn test_assistants_and_agents_predicates() {
        assert!(is_assistants_endpoint("assistants"));
        assert!(is_assistants_endpoint("azureAssistants"));
        assert!(!is_assistants_endpoint("agents"));
        assert!(is_agents_endpoint("agents"));
        assert!(!is_agents_endpoint("Agents"));
    }

    #[test]
    fn test_reasoning_enums_accept_empty_string() {
        let effort: ReasoningEffort = serde_json::from_str("\"\"").unwrap();
        assert_eq!(effort, ReasoningEffort::Unset);
        let summary: ReasoningSummary = serde_json::from_str("\"detailed\"").unwrap();
        assert_eq!(summary, ReasoningSummary::Detailed);
        assert_eq!(serde_json::to_string(&Verbosity::Unset).unwrap(), "\"\"");
    }

    #[test]
    fn test_settings_constants() {
        assert_eq!(OPENAI_SETTINGS.temperature.max, 2.0);
        assert_eq!(AGENTS_SETTINGS.temperature.max, 1.0);
        assert_eq!(AGENTS_SETTINGS.model, "gpt-3.5-turbo-test");
        assert_eq!(AGENTS_SETTINGS.top_p, OPENAI_SETTINGS.top_p);
        assert_eq!(GOOGLE_SETTINGS.thinking_budget.default, -1.0);
        assert_eq!(ANTHROPIC_SETTINGS.thinking_budget.step, 100.0);
        assert!(!ANTHROPIC_SETTINGS.top_k.contains(41.0));
    }

    #[test]
    fn test_anthropic_output_limits() {
        assert_eq!(anthropic_max_output_tokens_reset("claude-3-5-sonnet-latest"), 8192);
        assert_eq!(anthropic_max_output_tokens_reset("claude-3.7-sonnet"), 8192);
        assert_eq!(anthropic_max_output_tokens_reset("claude-sonnet-4-20250514"), 8192);
        assert_eq!(anthropic_max_output_tokens_reset("claude-3-opus-20240229"), 4096);
        assert_eq!(anthropic_max_output_tokens_reset("claude-2.1"), 4096);

        assert_eq!(anthropic_max_output_tokens_set(10_000, "claude-3-haiku"), 4096);
        assert_eq!(anthropic_max_output_tokens_set(2_000, "claude-3-haiku"), 2_000);
        assert_eq!(anthropic_max_output_tokens_set(10_000, "claude-opus-4-1"), 10_000);
    }
}
