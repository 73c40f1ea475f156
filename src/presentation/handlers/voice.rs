use axum::Json;
use axum::extract::{Multipart, State};
use serde::Serialize;

use crate::presentation::error::ApiError;
use crate::presentation::extractors::AuthenticatedUser;
use crate::presentation::state::AppState;

const AUDIO_FIELD: &str = "audio";

#[derive(Serialize)]
pub struct TranscriptionResponse {
    pub text: String,
}

#[tracing::instrument(skip(state, multipart), fields(user_id = %user_id))]
pub async fn voice_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<Json<TranscriptionResponse>, ApiError> {
    let mut audio = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() == Some(AUDIO_FIELD) {
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read audio: {}", e)))?;
            audio = Some(data);
            break;
        }
    }

    let audio = audio.ok_or_else(|| ApiError::BadRequest("No audio file uploaded".to_string()))?;
    tracing::debug!(bytes = audio.len(), "Received audio upload");

    let text = state.transcription.transcribe(&audio).await?;
    Ok(Json(TranscriptionResponse { text }))
}
