use axum::Json;
use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ConversationTurn, MessageKind};
use crate::presentation::error::ApiError;
use crate::presentation::extractors::AuthenticatedUser;
use crate::presentation::state::AppState;

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

#[derive(Deserialize)]
pub struct ConversationQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct TurnResponse {
    pub id: Uuid,
    pub input_kind: MessageKind,
    pub input_text: String,
    pub output_text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ConversationResponse {
    pub total: u64,
    pub turns: Vec<TurnResponse>,
}

impl From<ConversationTurn> for TurnResponse {
    fn from(turn: ConversationTurn) -> Self {
        Self {
            id: turn.id.as_uuid(),
            input_kind: turn.input_kind,
            input_text: turn.input_text,
            output_text: turn.output_text,
            created_at: turn.created_at,
        }
    }
}

/// Most recent persisted turns for the caller, oldest first.
#[tracing::instrument(skip(state, query), fields(user_id = %user_id))]
pub async fn conversations_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<ConversationResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let turns = state.conversations.recent_turns(user_id, limit).await?;
    let total = state.conversations.count_for_user(user_id).await?;

    Ok(Json(ConversationResponse {
        total,
        turns: turns.into_iter().map(TurnResponse::from).collect(),
    }))
}
