use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::{ErrorKind, InboundPayload, OutboundReply};
use crate::presentation::error::ApiError;
use crate::presentation::extractors::AuthenticatedUser;
use crate::presentation::state::AppState;

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
        ErrorKind::AuthError => StatusCode::UNAUTHORIZED,
        ErrorKind::InvalidToken | ErrorKind::UnknownUser => StatusCode::FORBIDDEN,
        ErrorKind::TranscriptionError | ErrorKind::GenerationError => StatusCode::BAD_GATEWAY,
        ErrorKind::PersistenceError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Request/response form of the chat channel. Voice content is base64 audio.
#[tracing::instrument(skip(state, payload), fields(user_id = %user_id))]
pub async fn chat_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    payload: Result<Json<InboundPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let message = payload.into_message(user_id).map_err(ApiError::BadRequest)?;

    // Detached so a client hanging up mid-turn does not cancel persistence.
    let chatbot = Arc::clone(&state.chatbot);
    let reply = tokio::spawn(async move { chatbot.handle_message(message).await })
        .await
        .map_err(|e| ApiError::Internal(format!("chat task failed: {}", e)))?;
    let status = match &reply {
        OutboundReply::Error { kind, .. } => status_for(*kind),
        OutboundReply::Reply { .. } => StatusCode::OK,
    };

    Ok((status, Json(reply)).into_response())
}
