//! Per-message conversation pipeline.
//!
//! Each inbound message moves through
//! `Verifying -> Transcribing (voice only) -> Generating -> Persisting -> UpdatingHistory -> Done`.
//! A failure at any stage ends the message with a [`ChatError`], which
//! [`ChatOrchestrator::handle_message`] turns into an error reply.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::application::ports::{ConversationRepository, RepositoryError, UserRepository};
use crate::domain::{
    AssistantReply, ConversationHistory, ConversationTurn, ErrorKind, InboundMessage,
    MessageContent, OutboundReply, UserId,
};
use crate::infrastructure::observability::sanitize_prompt;

use super::{
    GenerationError, ResponseGenerator, RetryPolicy, SessionStore, TranscriptionService,
    TranscriptionServiceError,
};

/// Longest accepted text message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatStage {
    Verifying,
    Transcribing,
    Generating,
    Persisting,
    UpdatingHistory,
    Done,
}

impl ChatStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatStage::Verifying => "verifying",
            ChatStage::Transcribing => "transcribing",
            ChatStage::Generating => "generating",
            ChatStage::Persisting => "persisting",
            ChatStage::UpdatingHistory => "updating_history",
            ChatStage::Done => "done",
        }
    }
}

impl fmt::Display for ChatStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What to do when a reply was generated but the turn could not be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceFailurePolicy {
    /// Return the reply marked `persisted: false` and keep it in the session history.
    #[default]
    DeliverReply,
    /// Fail the whole turn and leave the session history untouched.
    FailTurn,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChatOptions {
    pub retry: RetryPolicy,
    pub persistence_failure_policy: PersistenceFailurePolicy,
}

#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub input_text: String,
    pub reply: AssistantReply,
    pub persisted: bool,
    pub timestamp: DateTime<Utc>,
}

impl From<ChatOutcome> for OutboundReply {
    fn from(outcome: ChatOutcome) -> Self {
        OutboundReply::Reply {
            content: outcome.reply.content,
            urgent: outcome.reply.urgent,
            persisted: outcome.persisted,
            timestamp: outcome.timestamp,
        }
    }
}

pub struct ChatOrchestrator {
    users: Arc<dyn UserRepository>,
    conversations: Arc<dyn ConversationRepository>,
    sessions: Arc<SessionStore>,
    transcription: Arc<TranscriptionService>,
    generator: ResponseGenerator,
    options: ChatOptions,
}

impl ChatOrchestrator {
    pub fn new(
        users: Arc<dyn UserRepository>,
        conversations: Arc<dyn ConversationRepository>,
        sessions: Arc<SessionStore>,
        transcription: Arc<TranscriptionService>,
        generator: ResponseGenerator,
        options: ChatOptions,
    ) -> Self {
        Self {
            users,
            conversations,
            sessions,
            transcription,
            generator,
            options,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Runs the pipeline and shapes the result; errors become error replies.
    pub async fn handle_message(&self, message: InboundMessage) -> OutboundReply {
        let user_id = message.user_id;
        match self.process(message).await {
            Ok(outcome) => outcome.into(),
            Err(e) => {
                match e.kind() {
                    ErrorKind::ValidationError | ErrorKind::UnknownUser => {
                        tracing::warn!(user_id = %user_id, stage = %e.stage(), error = %e, "Chat message rejected")
                    }
                    _ => {
                        tracing::error!(user_id = %user_id, stage = %e.stage(), error = %e, "Chat message failed")
                    }
                }
                OutboundReply::error(e.kind(), e.client_message())
            }
        }
    }

    #[tracing::instrument(
        skip(self, message),
        fields(user_id = %message.user_id, kind = %message.content.kind())
    )]
    pub async fn process(&self, message: InboundMessage) -> Result<ChatOutcome, ChatError> {
        let user_id = message.user_id;
        let kind = message.content.kind();

        tracing::debug!(stage = %ChatStage::Verifying);
        self.verify_user(user_id).await?;

        let text = match message.content {
            MessageContent::Text(text) => validate_text(text)?,
            MessageContent::Voice(audio) => {
                tracing::debug!(stage = %ChatStage::Transcribing, bytes = audio.len());
                self.transcribe(&audio).await?
            }
        };

        tracing::debug!(stage = %ChatStage::Generating, text = %sanitize_prompt(&text));
        let mut history = self.sessions.lock(user_id).await;
        let reply = self.generate(&text, &history).await?;

        tracing::debug!(stage = %ChatStage::Persisting);
        let turn = ConversationTurn::new(user_id, kind, text.clone(), reply.content.clone());
        let persisted = match self.persist(&turn).await {
            Ok(()) => true,
            Err(e) => match self.options.persistence_failure_policy {
                PersistenceFailurePolicy::FailTurn => return Err(ChatError::Persistence(e)),
                PersistenceFailurePolicy::DeliverReply => {
                    tracing::error!(error = %e, turn_id = %turn.id.as_uuid(), "Turn not persisted, delivering reply anyway");
                    false
                }
            },
        };

        tracing::debug!(stage = %ChatStage::UpdatingHistory);
        history.push_exchange(text.clone(), reply.content.clone());
        let history_len = history.len();
        drop(history);

        tracing::info!(
            stage = %ChatStage::Done,
            history_len,
            persisted,
            urgent = reply.urgent,
            "Chat turn completed"
        );

        Ok(ChatOutcome {
            input_text: text,
            reply,
            persisted,
            timestamp: turn.created_at,
        })
    }

    async fn verify_user(&self, user_id: UserId) -> Result<(), ChatError> {
        match self.users.find_by_id(user_id).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(ChatError::UnknownUser(user_id)),
            Err(e) => Err(ChatError::Verification(e)),
        }
    }

    async fn transcribe(&self, audio: &[u8]) -> Result<String, ChatError> {
        self.options
            .retry
            .run(
                "transcription",
                TranscriptionServiceError::is_transient,
                || self.transcription.transcribe(audio),
            )
            .await
            .map_err(ChatError::Transcription)
    }

    async fn generate(
        &self,
        text: &str,
        history: &ConversationHistory,
    ) -> Result<AssistantReply, ChatError> {
        self.options
            .retry
            .run("generation", GenerationError::is_transient, || {
                self.generator.generate(text, history)
            })
            .await
            .map_err(ChatError::Generation)
    }

    async fn persist(&self, turn: &ConversationTurn) -> Result<(), RepositoryError> {
        self.options
            .retry
            .run("persistence", RepositoryError::is_transient, || {
                self.conversations.append_turn(turn)
            })
            .await
    }
}

fn validate_text(text: String) -> Result<String, ChatError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ChatError::Validation(
            "Message content must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(ChatError::Validation(format!(
            "Message exceeds {} characters",
            MAX_MESSAGE_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("unknown user: {0}")]
    UnknownUser(UserId),
    #[error("user lookup failed: {0}")]
    Verification(RepositoryError),
    #[error("invalid message: {0}")]
    Validation(String),
    #[error("transcription: {0}")]
    Transcription(TranscriptionServiceError),
    #[error("generation: {0}")]
    Generation(GenerationError),
    #[error("persistence: {0}")]
    Persistence(RepositoryError),
}

impl ChatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatError::UnknownUser(_) => ErrorKind::UnknownUser,
            ChatError::Verification(_) | ChatError::Persistence(_) => ErrorKind::PersistenceError,
            ChatError::Validation(_) => ErrorKind::ValidationError,
            ChatError::Transcription(e) if e.is_validation() => ErrorKind::ValidationError,
            ChatError::Transcription(_) => ErrorKind::TranscriptionError,
            ChatError::Generation(_) => ErrorKind::GenerationError,
        }
    }

    /// Stage the message was in when it failed.
    pub fn stage(&self) -> ChatStage {
        match self {
            ChatError::UnknownUser(_) | ChatError::Verification(_) | ChatError::Validation(_) => {
                ChatStage::Verifying
            }
            ChatError::Transcription(_) => ChatStage::Transcribing,
            ChatError::Generation(_) => ChatStage::Generating,
            ChatError::Persistence(_) => ChatStage::Persisting,
        }
    }

    /// Message safe to show to the caller.
    pub fn client_message(&self) -> String {
        match self {
            ChatError::UnknownUser(_) => "User not found".to_string(),
            ChatError::Verification(_) => "Unable to verify user".to_string(),
            ChatError::Validation(msg) => msg.clone(),
            ChatError::Transcription(e) if e.is_validation() => e.to_string(),
            ChatError::Transcription(_) => "Failed to transcribe audio".to_string(),
            ChatError::Generation(_) => "Failed to generate a response".to_string(),
            ChatError::Persistence(_) => "Failed to save conversation".to_string(),
        }
    }
}
