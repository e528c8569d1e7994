//! Twenty Questions - an LLM that guesses what you are thinking of
//!
//! A Rust backend driving the question/answer turn loop against a
//! remote LLM, persisting aggregate stats and serving a small UI.

mod api;
mod config;
mod db;
mod game;
mod llm;
mod prompt;
mod question;
mod runtime;

use api::{create_router, AppState};
use config::ServerConfig;
use db::Database;
use llm::{LlmConfig, ModelRegistry};
use runtime::{DatabaseStatsStore, LlmQuestionProvider, RuntimeManager, StatsTracker};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "twenty_questions=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = ServerConfig::from_env();

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;
    let stats = Arc::new(StatsTracker::load(Arc::new(DatabaseStatsStore::new(db))).await);

    // Initialize LLM registry
    let llm_registry = Arc::new(ModelRegistry::new(&LlmConfig::from_env()));
    if llm_registry.has_models() {
        tracing::info!(
            models = ?llm_registry.available_models(),
            default = ?llm_registry.default_model_id(),
            "LLM registry initialized"
        );
    } else {
        tracing::warn!(
            "No LLM API keys configured. Set GOOGLE_GENERATIVE_AI_API_KEY, ANTHROPIC_API_KEY or LLM_GATEWAY."
        );
    }

    let provider = Arc::new(LlmQuestionProvider::new(Arc::clone(&llm_registry)));
    let runtime = Arc::new(
        RuntimeManager::new(provider, stats)
            .with_provider_timeout(config.provider_timeout)
            .with_session_ttl(config.session_ttl),
    );

    // Sweep abandoned sessions; creation also sweeps
    {
        let runtime = Arc::clone(&runtime);
        let ttl = config.session_ttl;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(ttl);
            loop {
                ticker.tick().await;
                runtime.evict_idle().await;
            }
        });
    }
    let state = AppState::new(runtime, llm_registry);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Twenty Questions server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
