//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the game runtime with mock implementations.

use crate::db::Database;
use crate::game::Stats;
use crate::llm::{LlmError, LlmErrorKind, LlmRequest, ModelRegistry};
use crate::prompt::{build_turn_prompt, parse_reply, MAX_OUTPUT_TOKENS, SYSTEM_PROMPT, TEMPERATURE};
use crate::question::{ProviderError, QuestionReply, QuestionRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// Source of the next question or guess
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    async fn ask(&self, request: &QuestionRequest) -> Result<QuestionReply, ProviderError>;
}

/// Storage for the aggregate Stats record
#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn load(&self) -> Result<Stats, String>;

    async fn save(&self, stats: &Stats) -> Result<(), String>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: QuestionProvider + ?Sized> QuestionProvider for Arc<T> {
    async fn ask(&self, request: &QuestionRequest) -> Result<QuestionReply, ProviderError> {
        (**self).ask(request).await
    }
}

#[async_trait]
impl<T: StatsStore + ?Sized> StatsStore for Arc<T> {
    async fn load(&self) -> Result<Stats, String> {
        (**self).load().await
    }

    async fn save(&self, stats: &Stats) -> Result<(), String> {
        (**self).save(stats).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Question provider backed by the registry's default LLM
pub struct LlmQuestionProvider {
    registry: Arc<ModelRegistry>,
}

impl LlmQuestionProvider {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl QuestionProvider for LlmQuestionProvider {
    async fn ask(&self, request: &QuestionRequest) -> Result<QuestionReply, ProviderError> {
        let llm = self.registry.default().ok_or_else(|| {
            llm_error_to_provider_error(&LlmError::not_configured(
                "Set GOOGLE_GENERATIVE_AI_API_KEY, ANTHROPIC_API_KEY or LLM_GATEWAY",
            ))
        })?;

        let llm_request = LlmRequest::single_turn(SYSTEM_PROMPT, build_turn_prompt(request))
            .with_max_tokens(MAX_OUTPUT_TOKENS)
            .with_temperature(TEMPERATURE);

        let response = llm
            .complete(&llm_request)
            .await
            .map_err(|e| llm_error_to_provider_error(&e))?;

        parse_reply(&response.text)
    }
}

fn llm_error_to_provider_error(error: &LlmError) -> ProviderError {
    let details = format!("{:?}: {}", error.kind, error.message);
    let mapped = match error.kind {
        LlmErrorKind::NotConfigured => ProviderError::configuration("No LLM provider configured"),
        kind if kind.is_configuration() => {
            ProviderError::configuration("The LLM provider rejected our credentials")
        }
        LlmErrorKind::Network => ProviderError::transport("Could not reach the LLM provider"),
        LlmErrorKind::Unknown => ProviderError::transport("Unexpected reply from the LLM provider"),
        LlmErrorKind::RateLimit => ProviderError::provider("The LLM provider is rate limiting us"),
        _ => ProviderError::provider("The LLM provider failed to answer"),
    };
    mapped.with_details(details)
}

/// Adapter to use Database as a `StatsStore`
#[derive(Clone)]
pub struct DatabaseStatsStore {
    db: Database,
}

impl DatabaseStatsStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StatsStore for DatabaseStatsStore {
    async fn load(&self) -> Result<Stats, String> {
        self.db.get_stats().map_err(|e| e.to_string())
    }

    async fn save(&self, stats: &Stats) -> Result<(), String> {
        self.db.save_stats(stats).map_err(|e| e.to_string())
    }
}
