use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use medassist::application::ports::{ConversationRepository, PatientRepository, UserRepository};
use medassist::application::services::{
    AuthService, ChatOrchestrator, ResponseGenerator, SessionStore, TranscriptionService,
};
use medassist::infrastructure::audio::TranscriptionEngineFactory;
use medassist::infrastructure::auth::HmacSessionTokens;
use medassist::infrastructure::identity::IdentityProviderFactory;
use medassist::infrastructure::llm::LlmClientFactory;
use medassist::infrastructure::observability::{TracingConfig, init_tracing};
use medassist::infrastructure::persistence::{
    InMemoryConversationRepository, InMemoryPatientRepository, InMemoryUserRepository,
    PgConversationRepository, PgPatientRepository, PgUserRepository, create_pool, run_migrations,
};
use medassist::presentation::config::DatabaseBackend;
use medassist::presentation::{AppState, Environment, Settings, create_router};

struct Repositories {
    users: Arc<dyn UserRepository>,
    patients: Arc<dyn PatientRepository>,
    conversations: Arc<dyn ConversationRepository>,
}

async fn build_repositories(settings: &Settings) -> anyhow::Result<Repositories> {
    match settings.database.backend {
        DatabaseBackend::Postgres => {
            let pool = create_pool(&settings.database.url, settings.database.max_connections)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Running database migrations...");
            run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;

            Ok(Repositories {
                users: Arc::new(PgUserRepository::new(pool.clone())),
                patients: Arc::new(PgPatientRepository::new(pool.clone())),
                conversations: Arc::new(PgConversationRepository::new(pool)),
            })
        }
        DatabaseBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Repositories {
                users: Arc::new(InMemoryUserRepository::new()),
                patients: Arc::new(InMemoryPatientRepository::new()),
                conversations: Arc::new(InMemoryConversationRepository::new()),
            })
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;

    let settings = Settings::load(environment).context("Failed to load configuration")?;

    let json_format = settings.logging.enable_json
        || environment.prefers_json_logs()
        || std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    init_tracing(&TracingConfig::new(
        environment.as_str(),
        json_format,
        settings.logging.level.clone(),
    ));

    tracing::info!(%environment, "Application starting");

    let repositories = build_repositories(&settings).await?;

    let identity_provider = IdentityProviderFactory::create(&settings.identity)?;
    let tokens = Arc::new(HmacSessionTokens::new(
        settings.auth.token_secret.as_bytes(),
        chrono::Duration::minutes(settings.auth.token_ttl_minutes),
    ));
    let auth_service = Arc::new(AuthService::new(
        identity_provider,
        Arc::clone(&repositories.users),
        tokens,
    ));

    let engine = TranscriptionEngineFactory::create(&settings.transcription)?;
    let transcription = Arc::new(TranscriptionService::with_limit(
        engine,
        settings.transcription.max_audio_bytes,
    ));

    let llm_client = LlmClientFactory::create(&settings.llm)?;
    let generator = match settings.llm.system_prompt.clone() {
        Some(prompt) => ResponseGenerator::with_system_prompt(llm_client, prompt),
        None => ResponseGenerator::new(llm_client),
    };

    let sessions = Arc::new(SessionStore::new(
        settings.chat.history_limit,
        settings.chat.max_active_sessions,
    ));

    let chatbot = Arc::new(ChatOrchestrator::new(
        Arc::clone(&repositories.users),
        Arc::clone(&repositories.conversations),
        sessions,
        Arc::clone(&transcription),
        generator,
        settings.chat.options(),
    ));

    let state = AppState {
        auth_service,
        chatbot,
        transcription,
        patients: repositories.patients,
        conversations: repositories.conversations,
    };

    let router = create_router(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
