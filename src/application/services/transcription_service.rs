use std::sync::Arc;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};

/// Largest audio payload accepted for transcription.
pub const MAX_AUDIO_BYTES: usize = 5 * 1024 * 1024;

/// Validates audio payloads and normalizes engine output.
pub struct TranscriptionService {
    engine: Arc<dyn TranscriptionEngine>,
    max_audio_bytes: usize,
}

impl TranscriptionService {
    pub fn new(engine: Arc<dyn TranscriptionEngine>) -> Self {
        Self::with_limit(engine, MAX_AUDIO_BYTES)
    }

    pub fn with_limit(engine: Arc<dyn TranscriptionEngine>, max_audio_bytes: usize) -> Self {
        Self {
            engine,
            max_audio_bytes,
        }
    }

    pub fn max_audio_bytes(&self) -> usize {
        self.max_audio_bytes
    }

    #[tracing::instrument(skip(self, audio), fields(bytes = audio.len()))]
    pub async fn transcribe(&self, audio: &[u8]) -> Result<String, TranscriptionServiceError> {
        if audio.is_empty() {
            return Err(TranscriptionServiceError::EmptyAudio);
        }
        if audio.len() > self.max_audio_bytes {
            return Err(TranscriptionServiceError::AudioTooLarge {
                size: audio.len(),
                limit: self.max_audio_bytes,
            });
        }

        let transcript = self.engine.transcribe(audio).await?;
        let transcript = transcript.trim();
        if transcript.is_empty() {
            tracing::warn!("Transcription returned no text");
            return Err(TranscriptionServiceError::EmptyTranscript);
        }

        tracing::debug!(chars = transcript.len(), "Audio transcribed");
        Ok(transcript.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionServiceError {
    #[error("audio payload is empty")]
    EmptyAudio,
    #[error("audio payload of {size} bytes exceeds the {limit} byte limit")]
    AudioTooLarge { size: usize, limit: usize },
    #[error("engine: {0}")]
    Engine(#[from] TranscriptionError),
    #[error("transcription produced no text")]
    EmptyTranscript,
}

impl TranscriptionServiceError {
    /// Rejections caused by the caller's payload rather than the engine.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TranscriptionServiceError::EmptyAudio | TranscriptionServiceError::AudioTooLarge { .. }
        )
    }

    pub fn is_transient(&self) -> bool {
        match self {
            TranscriptionServiceError::Engine(e) => e.is_transient(),
            _ => false,
        }
    }
}
