use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{ConversationRepository, RepositoryError};
use crate::domain::{ConversationTurn, MessageKind, TurnId, UserId};
use crate::infrastructure::persistence::pg_pool::map_sqlx_error;

pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TurnRow {
    id: Uuid,
    user_id: Uuid,
    input_kind: String,
    input_text: String,
    output_text: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<TurnRow> for ConversationTurn {
    type Error = RepositoryError;

    fn try_from(row: TurnRow) -> Result<Self, Self::Error> {
        let input_kind = row
            .input_kind
            .parse::<MessageKind>()
            .map_err(RepositoryError::QueryFailed)?;

        Ok(ConversationTurn {
            id: TurnId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            input_kind,
            input_text: row.input_text,
            output_text: row.output_text,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    #[instrument(skip(self, turn), fields(turn_id = %turn.id.as_uuid(), user_id = %turn.user_id))]
    async fn append_turn(&self, turn: &ConversationTurn) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO conversation_turns (id, user_id, input_kind, input_text, output_text, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(turn.id.as_uuid())
        .bind(turn.user_id.as_uuid())
        .bind(turn.input_kind.as_str())
        .bind(&turn.input_text)
        .bind(&turn.output_text)
        .bind(turn.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user_id, limit = %limit))]
    async fn recent_turns(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, RepositoryError> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, TurnRow>(
            r#"
            SELECT id, user_id, input_kind, input_text, output_text, created_at
            FROM conversation_turns
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(limit_i64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut turns = rows
            .into_iter()
            .map(ConversationTurn::try_from)
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        turns.reverse();
        Ok(turns)
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn count_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM conversation_turns WHERE user_id = $1")
                .bind(user_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}
