mod conversation_repository;
mod identity_provider;
mod llm_client;
mod patient_repository;
mod repository_error;
mod session_tokens;
mod transcription_engine;
mod user_repository;

pub use conversation_repository::ConversationRepository;
pub use identity_provider::{IdentityError, IdentityProvider};
pub use llm_client::{CompletionPrompt, LlmClient, LlmClientError};
pub use patient_repository::PatientRepository;
pub use repository_error::RepositoryError;
pub use session_tokens::{SessionClaims, SessionTokens, TokenError};
pub use transcription_engine::{TranscriptionEngine, TranscriptionError};
pub use user_repository::UserRepository;
