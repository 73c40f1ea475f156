use async_trait::async_trait;

use crate::application::ports::{CompletionPrompt, LlmClient, LlmClientError};

/// Deterministic offline completion used by the `mock` provider.
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, prompt: &CompletionPrompt) -> Result<String, LlmClientError> {
        let last_user = prompt
            .messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        Ok(format!(
            "Thanks for your message. You said: \"{}\". This is an offline response; \
             please consult a healthcare professional for medical advice.",
            last_user
        ))
    }
}
