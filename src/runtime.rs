//! Runtime for executing game sessions
//!
//! Each session gets a `GameRuntime` that applies events through the pure
//! transition function and executes the resulting effects: provider calls
//! are fed back as events until the session is quiescent, finished games
//! are folded into the shared `StatsTracker`.

pub mod traits;

#[cfg(test)]
pub mod testing;

pub use traits::*;

use crate::game::{
    apply_outcome, transition, Difficulty, Effect, Event, Outcome, Session, Stats,
    TransitionError,
};
use crate::question::{ProviderError, QuestionReply, QuestionRequest};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Drives one game session
pub struct GameRuntime {
    id: String,
    /// Only ever locked for the duration of a transition
    session: Mutex<Session>,
    last_active: Mutex<Instant>,
    provider: Arc<dyn QuestionProvider>,
    stats: Arc<StatsTracker>,
    provider_timeout: Option<Duration>,
}

impl GameRuntime {
    pub fn new(
        id: impl Into<String>,
        difficulty: Difficulty,
        provider: Arc<dyn QuestionProvider>,
        stats: Arc<StatsTracker>,
    ) -> Self {
        Self {
            id: id.into(),
            session: Mutex::new(Session::idle(difficulty)),
            last_active: Mutex::new(Instant::now()),
            provider,
            stats,
            provider_timeout: None,
        }
    }

    /// Fail provider calls that take longer than `timeout`
    #[must_use]
    pub fn with_provider_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current session state
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    /// Time since the session last received an event or lookup
    pub fn idle_for(&self) -> Duration {
        self.last_active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }

    fn touch(&self) {
        *self.last_active.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        // Transitions are pure, a panic mid-update cannot leave a torn session
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a user intent and run its effects to completion.
    ///
    /// The effects run on a spawned task so a dropped caller cannot strand
    /// the session with an outstanding request.
    pub async fn dispatch(self: &Arc<Self>, event: Event) -> Result<Session, TransitionError> {
        let effects = self.apply(event)?;
        if !effects.is_empty() {
            let runtime = Arc::clone(self);
            if let Err(e) = tokio::spawn(async move { runtime.drain(effects).await }).await {
                tracing::error!(session_id = %self.id, error = %e, "Effect task failed");
                self.release_pending(&e.to_string());
            }
        }
        Ok(self.snapshot())
    }

    /// Fail an outstanding request whose task died before reporting back
    fn release_pending(&self, reason: &str) {
        if !self.snapshot().is_busy() {
            return;
        }
        let error = ProviderError::transport("The question request was interrupted")
            .with_details(reason);
        if let Err(e) = self.apply(Event::ProviderFailed { error }) {
            tracing::error!(session_id = %self.id, error = %e, "Could not release session");
        }
    }

    fn apply(&self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        self.touch();
        let name = event.name();
        let mut session = self.lock();

        let result = transition(&session, event).inspect_err(|e| {
            tracing::info!(session_id = %self.id, event = name, error = %e, "Event rejected");
        })?;

        if result.new_state.status != session.status {
            tracing::info!(
                session_id = %self.id,
                event = name,
                from = %session.status,
                to = %result.new_state.status,
                questions = result.new_state.history.len(),
                finished = result.new_state.status.is_terminal(),
                "Game status changed"
            );
        } else {
            tracing::debug!(session_id = %self.id, event = name, "Event applied");
        }

        *session = result.new_state;
        Ok(result.effects)
    }

    async fn drain(&self, effects: Vec<Effect>) {
        let mut queue = VecDeque::from(effects);
        while let Some(effect) = queue.pop_front() {
            let Some(event) = self.execute_effect(effect).await else {
                continue;
            };
            match self.apply(event) {
                Ok(effects) => queue.extend(effects),
                Err(e) => {
                    tracing::error!(session_id = %self.id, error = %e, "Provider outcome rejected");
                }
            }
        }
    }

    async fn execute_effect(&self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::RequestQuestion { request } => match self.ask(&request).await {
                Ok(reply) => {
                    tracing::debug!(
                        session_id = %self.id,
                        is_guess = reply.is_guess,
                        answered = request.history.len(),
                        "Question received"
                    );
                    Some(Event::QuestionReceived { reply })
                }
                Err(error) => {
                    tracing::warn!(
                        session_id = %self.id,
                        kind = ?error.kind,
                        error = %error,
                        details = ?error.details,
                        "Question provider failed"
                    );
                    Some(Event::ProviderFailed { error })
                }
            },
            Effect::RecordOutcome {
                outcome,
                question_count,
            } => {
                self.stats.record(outcome, question_count).await;
                None
            }
        }
    }

    async fn ask(&self, request: &QuestionRequest) -> Result<QuestionReply, ProviderError> {
        match self.provider_timeout {
            Some(limit) => tokio::time::timeout(limit, self.provider.ask(request))
                .await
                .unwrap_or_else(|_| {
                    Err(ProviderError::transport(format!(
                        "No reply from the question provider within {}s",
                        limit.as_secs_f32()
                    )))
                }),
            None => self.provider.ask(request).await,
        }
    }
}

/// Process-wide Stats with write-through persistence
pub struct StatsTracker {
    current: tokio::sync::Mutex<Stats>,
    store: Arc<dyn StatsStore>,
}

impl StatsTracker {
    pub fn new(initial: Stats, store: Arc<dyn StatsStore>) -> Self {
        Self {
            current: tokio::sync::Mutex::new(initial),
            store,
        }
    }

    /// Load the persisted record, starting from zero if it cannot be read
    pub async fn load(store: Arc<dyn StatsStore>) -> Self {
        let initial = match store.load().await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load stats, starting from zero");
                Stats::default()
            }
        };
        Self::new(initial, store)
    }

    /// Fold a finished game in and persist the result
    pub async fn record(&self, outcome: Outcome, question_count: usize) -> Stats {
        let mut current = self.current.lock().await;
        let updated = apply_outcome(&current, outcome, question_count);
        *current = updated;

        if let Err(e) = self.store.save(&updated).await {
            tracing::error!(error = %e, "Failed to persist stats");
        }
        tracing::info!(
            ?outcome,
            question_count,
            games_played = updated.games_played,
            games_won = updated.games_won,
            "Recorded game outcome"
        );
        updated
    }

    pub async fn current(&self) -> Stats {
        *self.current.lock().await
    }
}

/// Manager for all live game sessions
pub struct RuntimeManager {
    provider: Arc<dyn QuestionProvider>,
    stats: Arc<StatsTracker>,
    provider_timeout: Option<Duration>,
    session_ttl: Duration,
    runtimes: RwLock<HashMap<String, Arc<GameRuntime>>>,
}

impl RuntimeManager {
    pub fn new(provider: Arc<dyn QuestionProvider>, stats: Arc<StatsTracker>) -> Self {
        Self {
            provider,
            stats,
            provider_timeout: None,
            session_ttl: Duration::from_secs(60 * 60),
            runtimes: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_provider_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.provider_timeout = timeout;
        self
    }

    /// Drop sessions left idle for longer than `ttl`
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// The provider shared by every session
    pub fn provider(&self) -> &Arc<dyn QuestionProvider> {
        &self.provider
    }

    pub fn stats(&self) -> &Arc<StatsTracker> {
        &self.stats
    }

    /// Create an idle session
    pub async fn create(&self, difficulty: Difficulty) -> Arc<GameRuntime> {
        self.evict_idle().await;
        let id = uuid::Uuid::new_v4().to_string();
        let runtime = Arc::new(
            GameRuntime::new(
                id.clone(),
                difficulty,
                Arc::clone(&self.provider),
                Arc::clone(&self.stats),
            )
            .with_provider_timeout(self.provider_timeout),
        );
        self.runtimes.write().await.insert(id.clone(), Arc::clone(&runtime));
        tracing::info!(session_id = %id, %difficulty, "Created session");
        runtime
    }

    pub async fn get(&self, id: &str) -> Option<Arc<GameRuntime>> {
        let runtime = self.runtimes.read().await.get(id).cloned()?;
        runtime.touch();
        Some(runtime)
    }

    /// Drop a session; an in-flight provider call finishes on its own task
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.runtimes.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Removed session");
        }
        removed
    }

    /// Remove sessions idle past the TTL. Sessions waiting on the provider
    /// are kept.
    pub async fn evict_idle(&self) -> usize {
        let mut runtimes = self.runtimes.write().await;
        let before = runtimes.len();
        runtimes.retain(|_, runtime| {
            runtime.idle_for() <= self.session_ttl || runtime.snapshot().is_busy()
        });
        let evicted = before - runtimes.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = runtimes.len(), "Evicted idle sessions");
        }
        evicted
    }

    #[allow(dead_code)] // Used in tests
    pub async fn session_count(&self) -> usize {
        self.runtimes.read().await.len()
    }
}
