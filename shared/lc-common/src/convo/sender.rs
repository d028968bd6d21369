//! Display name of the assistant side of a conversation.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::endpoints::ModelEndpoint;

/// The subset of endpoint options that decides the sender name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EndpointOption {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_gpt_label: Option<String>,
    /// Label configured for a custom endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_display_label: Option<String>,
}

static OMNI_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bo(\d)\b").expect("valid regex"));

static MISTRAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bmistral\b").expect("valid regex"));

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

/// Name derived from an OpenAI-style model id, if any rule matches.
fn openai_model_name(model: &str) -> Option<String> {
    if let Some(caps) = OMNI_VERSION.captures(model) {
        return Some(format!("o{}", &caps[1]));
    }
    if MISTRAL.is_match(model) {
        return Some("Mistral".to_string());
    }
    if model.contains("gpt-3") {
        return Some("GPT-3.5".to_string());
    }
    if model.contains("gpt-4o") {
        return Some("GPT-4o".to_string());
    }
    if model.contains("gpt-4") {
        return Some("GPT-4".to_string());
    }
    None
}

/// Pick the name shown next to assistant messages.
///
/// ```
/// use lc_common::convo::{response_sender, EndpointOption};
///
/// let option = EndpointOption {
///     endpoint: "openAI".into(),
///     model: Some("gpt-4o-mini".into()),
///     ..Default::default()
/// };
/// assert_eq!(response_sender(&option), "GPT-4o");
/// ```
#[must_use]
pub fn response_sender(option: &EndpointOption) -> String {
    let model = option.model.as_deref().unwrap_or_default();
    let model_label = non_empty(option.model_label.as_ref());
    let chat_gpt_label = non_empty(option.chat_gpt_label.as_ref());
    let endpoint = ModelEndpoint::parse(&option.endpoint);
    let is_custom = endpoint == Some(ModelEndpoint::Custom)
        || option.endpoint_type.as_deref() == Some(ModelEndpoint::Custom.as_str());

    match endpoint {
        Some(
            e @ (ModelEndpoint::OpenAI
            | ModelEndpoint::AzureOpenAI
            | ModelEndpoint::GptPlugins
            | ModelEndpoint::ChatGptBrowser),
        ) => chat_gpt_label
            .or(model_label)
            .map(str::to_string)
            .or_else(|| openai_model_name(model))
            .unwrap_or_else(|| e.alternate_name().to_string()),
        Some(ModelEndpoint::Anthropic) => model_label.unwrap_or("Claude").to_string(),
        Some(ModelEndpoint::Bedrock) => model_label
            .unwrap_or(ModelEndpoint::Bedrock.alternate_name())
            .to_string(),
        Some(ModelEndpoint::Google) => {
            if let Some(label) = model_label {
                label.to_string()
            } else if model.contains("gemini") || model.contains("learnlm") {
                "Gemini".to_string()
            } else if model.to_lowercase().contains("gemma") {
                "Gemma".to_string()
            } else {
                "PaLM2".to_string()
            }
        }
        _ if is_custom => model_label
            .or(chat_gpt_label)
            .map(str::to_string)
            .or_else(|| openai_model_name(model))
            .or_else(|| non_empty(option.model_display_label.as_ref()).map(str::to_string))
            .unwrap_or_else(|| "AI".to_string()),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(endpoint: &str, model: &str) -> EndpointOption {
        EndpointOption {
            endpoint: endpoint.into(),
            model: Some(model.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_openai_model_names() {
        assert_eq!(response_sender(&option("openAI", "o1-preview")), "o1");
        assert_eq!(response_sender(&option("openAI", "o3-mini")), "o3");
        assert_eq!(response_sender(&option("openAI", "gpt-3.5-turbo")), "GPT-3.5");
        assert_eq!(response_sender(&option("azureOpenAI", "gpt-4o")), "GPT-4o");
        assert_eq!(response_sender(&option("openAI", "gpt-4-turbo")), "GPT-4");
        assert_eq!(response_sender(&option("openAI", "open-mistral-7b")), "Mistral");
        assert_eq!(response_sender(&option("openAI", "davinci")), "OpenAI");
        assert_eq!(response_sender(&option("azureOpenAI", "davinci")), "Azure OpenAI");
    }

    #[test]
    fn test_labels_win() {
        let mut opt = option("openAI", "gpt-4");
        opt.model_label = Some("Model".into());
        assert_eq!(response_sender(&opt), "Model");
        opt.chat_gpt_label = Some("Legacy".into());
        assert_eq!(response_sender(&opt), "Legacy");

        let mut anthropic = option("anthropic", "claude-3");
        assert_eq!(response_sender(&anthropic), "Claude");
        anthropic.model_label = Some("Sonnet".into());
        assert_eq!(response_sender(&anthropic), "Sonnet");
    }

    #[test]
    fn test_google_and_bedrock() {
        assert_eq!(response_sender(&option("google", "gemini-1.5-pro")), "Gemini");
        assert_eq!(response_sender(&option("google", "learnlm-1.5")), "Gemini");
        assert_eq!(response_sender(&option("google", "Gemma-2")), "Gemma");
        assert_eq!(response_sender(&option("google", "chat-bison")), "PaLM2");
        assert_eq!(response_sender(&option("bedrock", "amazon.titan")), "AWS Bedrock");
    }

    #[test]
    fn test_custom_endpoints() {
        let mut opt = option("groq", "llama3-70b");
        opt.endpoint_type = Some("custom".into());
        assert_eq!(response_sender(&opt), "AI");
        opt.model_display_label = Some("Groq".into());
        assert_eq!(response_sender(&opt), "Groq");
        opt.model = Some("mistral-large".into());
        assert_eq!(response_sender(&opt), "Mistral");
    }

    #[test]
    fn test_other_endpoints_are_blank() {
        assert_eq!(response_sender(&option("assistants", "gpt-4")), "");
        assert_eq!(response_sender(&option("agents", "gpt-4")), "");
        assert_eq!(response_sender(&option("groq", "llama3")), "");
    }
}
