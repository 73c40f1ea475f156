use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::application::ports::{CompletionPrompt, LlmClient, LlmClientError};
use crate::domain::{AssistantReply, ChatMessage, ConversationHistory};

pub const MEDICAL_ASSISTANT_PROMPT: &str = "You are a careful medical assistant helping patients \
and clinicians. Answer clearly and concisely, explain medical terms in plain language, and never \
present a diagnosis as certain. Recommend consulting a qualified healthcare professional for \
personal medical decisions. If the user describes symptoms that may be an emergency, tell them \
to seek immediate care or contact emergency services.";

pub const EMERGENCY_NOTICE: &str = "If you think you may be having a medical emergency, call your \
local emergency number or go to the nearest emergency room immediately.";

static URGENT_CARE_LANGUAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(emergency (room|department|services|number)|call (911|112|999|an ambulance)|seek (immediate|urgent|emergency) (medical )?(care|attention|help)|go to (the )?(er|a&e|hospital) (now|immediately)|medical emergency|urgent care)\b",
    )
    .expect("urgent care pattern is valid")
});

static RED_FLAG_SYMPTOMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(chest pain|can(no|')t breathe|difficulty breathing|shortness of breath|stroke|unconscious|severe bleeding|suicidal|overdose|seizure|anaphyla\w*)\b",
    )
    .expect("red flag pattern is valid")
});

static ROLE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*assistant\s*:\s*").expect("role prefix pattern is valid"));

static EXCESS_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank line pattern is valid"));

/// Turns history plus new input into a model reply.
pub struct ResponseGenerator {
    llm_client: Arc<dyn LlmClient>,
    system_prompt: String,
}

impl ResponseGenerator {
    pub fn new(llm_client: Arc<dyn LlmClient>) -> Self {
        Self::with_system_prompt(llm_client, MEDICAL_ASSISTANT_PROMPT.to_string())
    }

    pub fn with_system_prompt(llm_client: Arc<dyn LlmClient>, system_prompt: String) -> Self {
        Self {
            llm_client,
            system_prompt,
        }
    }

    /// Prior turns oldest first, followed by the new user text.
    pub fn build_prompt(&self, text: &str, history: &ConversationHistory) -> CompletionPrompt {
        let mut messages: Vec<ChatMessage> = history.messages().cloned().collect();
        messages.push(ChatMessage::user(text));

        CompletionPrompt {
            system: self.system_prompt.clone(),
            messages,
        }
    }

    #[tracing::instrument(skip_all, fields(history_len = history.len()))]
    pub async fn generate(
        &self,
        text: &str,
        history: &ConversationHistory,
    ) -> Result<AssistantReply, GenerationError> {
        let prompt = self.build_prompt(text, history);
        let raw = self.llm_client.complete(&prompt).await?;
        shape_reply(text, &raw)
    }
}

/// Normalizes a raw completion and flags urgent-care content.
pub fn shape_reply(user_text: &str, raw: &str) -> Result<AssistantReply, GenerationError> {
    let without_prefix = ROLE_PREFIX.replace(raw.trim(), "");
    let mut content = EXCESS_BLANK_LINES
        .replace_all(without_prefix.trim(), "\n\n")
        .into_owned();

    if content.is_empty() {
        return Err(GenerationError::EmptyCompletion);
    }

    let reply_is_urgent = URGENT_CARE_LANGUAGE.is_match(&content);
    let input_is_urgent = RED_FLAG_SYMPTOMS.is_match(user_text);

    if input_is_urgent && !reply_is_urgent {
        content.push_str("\n\n");
        content.push_str(EMERGENCY_NOTICE);
    }

    Ok(AssistantReply {
        content,
        urgent: reply_is_urgent || input_is_urgent,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("completion: {0}")]
    Completion(#[from] LlmClientError),
    #[error("completion was empty")]
    EmptyCompletion,
}

impl GenerationError {
    pub fn is_transient(&self) -> bool {
        match self {
            GenerationError::Completion(e) => e.is_transient(),
            GenerationError::EmptyCompletion => false,
        }
    }
}
