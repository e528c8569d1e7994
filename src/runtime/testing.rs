//! Mock implementations for testing
//!
//! These mocks enable runtime and API tests without a real LLM or database.

use super::traits::{QuestionProvider, StatsStore};
use crate::game::Stats;
use crate::question::{ProviderError, QuestionReply, QuestionRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock Question Provider
// ============================================================================

/// Mock provider that returns queued replies
#[derive(Default)]
pub struct MockQuestionProvider {
    replies: Mutex<VecDeque<Result<QuestionReply, ProviderError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<QuestionRequest>>,
}

impl MockQuestionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a plain question
    pub fn queue_question(&self, text: &str) {
        self.queue(Ok(QuestionReply::question(text)));
    }

    /// Queue a final guess
    pub fn queue_guess(&self, text: &str) {
        self.queue(Ok(QuestionReply::guess(text)));
    }

    /// Queue a failure
    pub fn queue_error(&self, error: ProviderError) {
        self.queue(Err(error));
    }

    pub fn queue(&self, reply: Result<QuestionReply, ProviderError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<QuestionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self, request: &QuestionRequest) -> Result<QuestionReply, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::transport("No mock reply queued")))
    }
}

#[async_trait]
impl QuestionProvider for MockQuestionProvider {
    async fn ask(&self, request: &QuestionRequest) -> Result<QuestionReply, ProviderError> {
        self.next_reply(request)
    }
}

// ============================================================================
// Gated Mock Provider (for concurrency testing)
// ============================================================================

/// Mock provider that holds every call until the test releases it
#[derive(Default)]
pub struct GatedMockProvider {
    inner: MockQuestionProvider,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
    /// Notify once to let one outstanding request finish
    pub release: Arc<Notify>,
}

impl GatedMockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_question(&self, text: &str) {
        self.inner.queue_question(text);
    }

    pub fn recorded_requests(&self) -> Vec<QuestionRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl QuestionProvider for GatedMockProvider {
    async fn ask(&self, request: &QuestionRequest) -> Result<QuestionReply, ProviderError> {
        self.request_started.notify_one();
        self.release.notified().await;
        self.inner.next_reply(request)
    }
}

/// Mock provider that never answers in time
pub struct StalledProvider;

#[async_trait]
impl QuestionProvider for StalledProvider {
    async fn ask(&self, _request: &QuestionRequest) -> Result<QuestionReply, ProviderError> {
        std::future::pending().await
    }
}

/// Mock provider whose call panics
pub struct PanickingProvider;

#[async_trait]
impl QuestionProvider for PanickingProvider {
    async fn ask(&self, _request: &QuestionRequest) -> Result<QuestionReply, ProviderError> {
        panic!("provider blew up")
    }
}

// ============================================================================
// In-memory Stats Store
// ============================================================================

/// Stats store that keeps the record in memory
#[derive(Default)]
pub struct MemoryStatsStore {
    stats: Mutex<Stats>,
    fail_saves: bool,
    /// Number of successful saves
    pub saves: Mutex<usize>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stats(stats: Stats) -> Self {
        Self {
            stats: Mutex::new(stats),
            ..Self::default()
        }
    }

    /// Store whose writes always fail
    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn stored(&self) -> Stats {
        *self.stats.lock().unwrap()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

#[async_trait]
impl StatsStore for MemoryStatsStore {
    async fn load(&self) -> Result<Stats, String> {
        Ok(*self.stats.lock().unwrap())
    }

    async fn save(&self, stats: &Stats) -> Result<(), String> {
        if self.fail_saves {
            return Err("disk full".to_string());
        }
        *self.stats.lock().unwrap() = *stats;
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }
}
