use async_trait::async_trait;

use crate::domain::{ConversationTurn, UserId};

use super::RepositoryError;

/// Append-only log of conversation turns.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn append_turn(&self, turn: &ConversationTurn) -> Result<(), RepositoryError>;

    /// Most recent `limit` turns for a user, oldest first.
    async fn recent_turns(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, RepositoryError>;

    async fn count_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError>;
}
