use std::sync::Arc;

use crate::application::ports::{ConversationRepository, PatientRepository};
use crate::application::services::{AuthService, ChatOrchestrator, TranscriptionService};

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub chatbot: Arc<ChatOrchestrator>,
    pub transcription: Arc<TranscriptionService>,
    pub patients: Arc<dyn PatientRepository>,
    pub conversations: Arc<dyn ConversationRepository>,
}
