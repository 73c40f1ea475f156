use async_trait::async_trait;

#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(&self, audio_data: &[u8]) -> Result<String, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("configuration: {0}")]
    Configuration(String),
}

impl TranscriptionError {
    pub fn is_transient(&self) -> bool {
        matches!(self, TranscriptionError::ApiRequestFailed(_))
    }
}
