mod auth_service;
mod chat_orchestrator;
mod response_generator;
mod retry_policy;
mod session_store;
mod transcription_service;

pub use auth_service::{AuthError, AuthSession, AuthService};
pub use chat_orchestrator::{
    ChatError, ChatOptions, ChatOrchestrator, ChatOutcome, ChatStage, MAX_MESSAGE_LENGTH,
    PersistenceFailurePolicy,
};
pub use response_generator::{
    EMERGENCY_NOTICE, GenerationError, MEDICAL_ASSISTANT_PROMPT, ResponseGenerator, shape_reply,
};
pub use retry_policy::RetryPolicy;
pub use session_store::{SessionGuard, SessionStore};
pub use transcription_service::{MAX_AUDIO_BYTES, TranscriptionService, TranscriptionServiceError};
