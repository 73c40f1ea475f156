use chrono::{DateTime, Utc};

use super::{MessageKind, TurnId, UserId};

/// One persisted user input and generated reply. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub id: TurnId,
    pub user_id: UserId,
    pub input_kind: MessageKind,
    pub input_text: String,
    pub output_text: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(
        user_id: UserId,
        input_kind: MessageKind,
        input_text: String,
        output_text: String,
    ) -> Self {
        Self {
            id: TurnId::new(),
            user_id,
            input_kind,
            input_text,
            output_text,
            created_at: Utc::now(),
        }
    }
}
