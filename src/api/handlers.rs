//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::types::{
    AnswerRequest, CreateSessionRequest, DifficultyInfo, ErrorResponse, GuessRequest, ModelInfo,
    ModelsResponse, SessionSnapshot, StartRequest, StatsResponse,
};
use super::AppState;
use crate::game::{Difficulty, Event, TransitionError};
use crate::llm::all_models;
use crate::question::{ProviderError, QuestionReply, QuestionRequest};
use crate::runtime::QuestionProvider;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root serves the SPA
        .route("/", get(serve_spa))
        // Static assets (embedded or filesystem fallback)
        .route("/assets/*path", get(serve_static))
        // Stateless question endpoint
        .route("/api/question", post(ask_question))
        // Sessions
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/start", post(start_game))
        .route("/api/sessions/:id/answer", post(submit_answer))
        .route("/api/sessions/:id/guess", post(confirm_guess))
        .route("/api/sessions/:id/undo", post(undo))
        .route("/api/sessions/:id/give-up", post(give_up))
        .route("/api/sessions/:id/play-again", post(play_again))
        .route("/api/sessions/:id/dismiss-error", post(dismiss_error))
        // Stats and metadata
        .route("/api/stats", get(get_stats))
        .route("/api/difficulties", get(list_difficulties))
        .route("/api/models", get(list_models))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// SPA Handler
// ============================================================

async fn serve_spa() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - UI not found</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Stateless Question Endpoint
// ============================================================

async fn ask_question(
    State(state): State<AppState>,
    Json(request): Json<QuestionRequest>,
) -> Result<Json<QuestionReply>, AppError> {
    if request.max_questions == 0 {
        return Err(AppError::BadRequest(
            "maxQuestions must be at least 1".to_string(),
        ));
    }
    if request.history.len() > request.max_questions {
        return Err(AppError::BadRequest(format!(
            "history has {} entries but maxQuestions is {}",
            request.history.len(),
            request.max_questions
        )));
    }

    let reply = state
        .runtime
        .provider()
        .ask(&request)
        .await
        .map_err(|error| {
            tracing::warn!(kind = ?error.kind, error = %error, "Stateless question failed");
            AppError::Provider(error)
        })?;
    Ok(Json(reply))
}

// ============================================================
// Sessions
// ============================================================

async fn create_session(
    State(state): State<AppState>,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    let request = optional_body(body)?;
    let runtime = state.runtime.create(request.difficulty).await;
    let session = runtime
        .dispatch(Event::Start {
            difficulty: request.difficulty,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionSnapshot::new(runtime.id(), &session)),
    ))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let runtime = state
        .runtime
        .get(&id)
        .await
        .ok_or_else(|| session_not_found(&id))?;
    Ok(Json(SessionSnapshot::new(runtime.id(), &runtime.snapshot())))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.runtime.remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(&id))
    }
}

async fn start_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<StartRequest>, JsonRejection>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let request = optional_body(body)?;
    let runtime = state
        .runtime
        .get(&id)
        .await
        .ok_or_else(|| session_not_found(&id))?;
    let difficulty = request
        .difficulty
        .unwrap_or_else(|| runtime.snapshot().difficulty);
    let session = runtime.dispatch(Event::Start { difficulty }).await?;
    Ok(Json(SessionSnapshot::new(runtime.id(), &session)))
}

async fn submit_answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    dispatch(&state, &id, Event::Answer {
        answer: request.answer,
    })
    .await
}

async fn confirm_guess(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<GuessRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    dispatch(&state, &id, Event::ConfirmGuess {
        correct: request.correct,
    })
    .await
}

async fn undo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    dispatch(&state, &id, Event::Undo).await
}

async fn give_up(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    dispatch(&state, &id, Event::GiveUp).await
}

async fn play_again(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    dispatch(&state, &id, Event::PlayAgain).await
}

async fn dismiss_error(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    dispatch(&state, &id, Event::DismissError).await
}

async fn dispatch(
    state: &AppState,
    id: &str,
    event: Event,
) -> Result<Json<SessionSnapshot>, AppError> {
    let runtime = state
        .runtime
        .get(id)
        .await
        .ok_or_else(|| session_not_found(id))?;
    let session = runtime.dispatch(event).await?;
    Ok(Json(SessionSnapshot::new(runtime.id(), &session)))
}

fn session_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Session not found: {id}"))
}

// ============================================================
// Stats and Metadata
// ============================================================

async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.runtime.stats().current().await.into())
}

async fn list_difficulties() -> Json<Vec<DifficultyInfo>> {
    Json(
        Difficulty::ALL
            .iter()
            .map(|&difficulty| DifficultyInfo {
                difficulty,
                max_questions: difficulty.max_questions(),
            })
            .collect(),
    )
}

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let models = all_models()
        .iter()
        .filter(|m| state.llm_registry.get(m.id).is_some())
        .map(|m| ModelInfo {
            id: m.id.to_string(),
            provider: m.provider.display_name().to_string(),
            description: m.description.to_string(),
        })
        .collect();

    Json(ModelsResponse {
        models,
        default: state.llm_registry.default_model_id().map(String::from),
    })
}

async fn get_version() -> &'static str {
    concat!("twenty-questions ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

/// A request without a JSON body takes the defaults; a body that is sent
/// must parse
fn optional_body<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match body {
        Ok(Json(request)) => Ok(request),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(AppError::InvalidBody(rejection)),
    }
}

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    /// Body present but not acceptable; keeps the extractor's 400/415/422
    InvalidBody(JsonRejection),
    NotFound(String),
    /// The session refused the intent in its current state
    Conflict(TransitionError),
    Provider(ProviderError),
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        AppError::Conflict(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg)),
            AppError::InvalidBody(rejection) => (
                rejection.status(),
                ErrorResponse::new("Invalid request body").with_details(Some(rejection.body_text())),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new(msg)),
            AppError::Conflict(e) => (StatusCode::CONFLICT, ErrorResponse::new(e.to_string())),
            AppError::Provider(e) => {
                let status = if e.is_configuration() {
                    StatusCode::SERVICE_UNAVAILABLE
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, ErrorResponse::new(e.message).with_details(e.details))
            }
        };

        (status, Json(body)).into_response()
    }
}
