use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use concierge::config::AppConfig;
use concierge::handlers;
use concierge::services::ai::ollama::OllamaProvider;
use concierge::services::ai::openai::OpenAiProvider;
use concierge::services::ai::LlmProvider;
use concierge::services::booking::http::HttpBookingGateway;
use concierge::services::knowledge::KnowledgeBase;
use concierge::services::sessions::{self, PhoneLocks};
use concierge::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let knowledge = KnowledgeBase::load(&config.properties_path, &config.faq_path)?;

    let llm: Box<dyn LlmProvider> = match config.llm_provider.as_str() {
        "ollama" => {
            tracing::info!("using Ollama LLM provider (url: {}, model: {})", config.ollama_url, config.ollama_model);
            Box::new(OllamaProvider::new(config.ollama_url.clone(), config.ollama_model.clone()))
        }
        _ => {
            anyhow::ensure!(!config.openai_api_key.is_empty(), "OPENAI_API_KEY must be set when LLM_PROVIDER=openai");
            tracing::info!("using OpenAI-compatible LLM provider (model: {})", config.openai_model);
            Box::new(OpenAiProvider::new(
                config.openai_api_key.clone(),
                config.openai_model.clone(),
                config.openai_base_url.clone(),
            ))
        }
    };

    let gateway = HttpBookingGateway::new(
        config.booking_api_url.clone(),
        config.booking_username.clone(),
        config.booking_password.clone(),
    )
    .with_confirmed_status(config.confirmed_status.clone())
    .with_window(config.reservations_from.clone(), config.reservations_to.clone());

    let sessions = sessions::connect(&config.database_url);
    tracing::info!(backend = sessions.backend(), "session store ready");

    let state = Arc::new(AppState {
        config: config.clone(),
        gateway: Box::new(gateway),
        knowledge,
        llm,
        sessions,
        phone_locks: PhoneLocks::default(),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/chat", post(handlers::chat::send_message))
        .route(
            "/api/sessions",
            get(handlers::sessions::list_sessions).delete(handlers::sessions::clear_sessions),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
