use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    chat_handler, chat_socket_handler, conversations_handler, create_patient_handler,
    get_patient_handler, health_handler, list_patients_handler, login_handler, signup_handler,
    voice_handler,
};
use crate::presentation::state::AppState;

/// Room for multipart framing around the audio part.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let upload_limit = state.transcription.max_audio_bytes() + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/auth/signup", post(signup_handler))
        .route("/api/auth/login", post(login_handler))
        .route(
            "/api/patients",
            get(list_patients_handler).post(create_patient_handler),
        )
        .route("/api/patients/{id}", get(get_patient_handler))
        .route(
            "/api/voice",
            post(voice_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/chat",
            post(chat_handler).layer(DefaultBodyLimit::max(upload_limit * 2)),
        )
        .route("/api/conversations", get(conversations_handler))
        .route("/ws", get(chat_socket_handler))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
