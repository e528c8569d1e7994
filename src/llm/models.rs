//! Centralized model definitions for all LLM providers

use super::anthropic::AnthropicModel;
use super::gemini::GeminiModel;
use super::{AnthropicService, GeminiService, LlmService};
use std::sync::Arc;

/// LLM provider enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Google,
    Anthropic,
}

impl Provider {
    /// Get the display name for this provider
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Google => "Google",
            Provider::Anthropic => "Anthropic",
        }
    }

    /// Get the environment variable name for this provider's API key
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            Provider::Google => "GOOGLE_GENERATIVE_AI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// Model definition with metadata
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// User-facing model ID (e.g., "gemini-2.5-flash")
    pub id: &'static str,
    /// Provider for this model
    pub provider: Provider,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function to create the service
    pub factory: fn(&str, Option<&str>) -> Result<Arc<dyn LlmService>, String>,
}

fn gemini(api_key: &str, model: GeminiModel, gateway: Option<&str>) -> Result<Arc<dyn LlmService>, String> {
    if api_key.is_empty() {
        return Err(format!(
            "{} requires {} or gateway",
            model.model_id(),
            Provider::Google.api_key_env_var()
        ));
    }
    Ok(Arc::new(GeminiService::new(api_key.to_string(), model, gateway)?))
}

fn anthropic(
    api_key: &str,
    model: AnthropicModel,
    gateway: Option<&str>,
) -> Result<Arc<dyn LlmService>, String> {
    if api_key.is_empty() {
        return Err(format!(
            "{} requires {} or gateway",
            model.model_id(),
            Provider::Anthropic.api_key_env_var()
        ));
    }
    Ok(Arc::new(AnthropicService::new(api_key.to_string(), model, gateway)?))
}

/// Get all available model definitions, in order of preference
pub fn all_models() -> &'static [ModelDef] {
    &[
        ModelDef {
            id: "gemini-2.5-flash",
            provider: Provider::Google,
            description: "Gemini 2.5 Flash (fast, the default question asker)",
            factory: |api_key, gateway| gemini(api_key, GeminiModel::Gemini25Flash, gateway),
        },
        ModelDef {
            id: "gemini-2.5-pro",
            provider: Provider::Google,
            description: "Gemini 2.5 Pro (stronger deduction, slower)",
            factory: |api_key, gateway| gemini(api_key, GeminiModel::Gemini25Pro, gateway),
        },
        ModelDef {
            id: "claude-4.5-haiku",
            provider: Provider::Anthropic,
            description: "Claude Haiku 4.5 (fast, efficient)",
            factory: |api_key, gateway| anthropic(api_key, AnthropicModel::Claude45Haiku, gateway),
        },
        ModelDef {
            id: "claude-4.5-sonnet",
            provider: Provider::Anthropic,
            description: "Claude Sonnet 4.5 (balanced performance)",
            factory: |api_key, gateway| {
                anthropic(api_key, AnthropicModel::Claude45Sonnet, gateway)
            },
        },
    ]
}
