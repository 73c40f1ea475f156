use async_trait::async_trait;

use crate::domain::ChatMessage;

/// Structured input for one completion: system instruction plus role-tagged turns,
/// the last of which is the new user text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPrompt {
    pub system: String,
    pub messages: Vec<ChatMessage>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &CompletionPrompt) -> Result<String, LlmClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("configuration: {0}")]
    Configuration(String),
}

impl LlmClientError {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmClientError::ApiRequestFailed(_) | LlmClientError::RateLimited
        )
    }
}
