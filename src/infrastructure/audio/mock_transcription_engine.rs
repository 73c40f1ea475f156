use async_trait::async_trait;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};

/// Offline engine that describes the payload instead of transcribing it.
pub struct MockTranscriptionEngine;

#[async_trait]
impl TranscriptionEngine for MockTranscriptionEngine {
    async fn transcribe(&self, audio_data: &[u8]) -> Result<String, TranscriptionError> {
        let format = super::AudioFormat::detect(audio_data);
        Ok(format!(
            "Mock transcript of {} bytes of {} audio",
            audio_data.len(),
            format.mime_type()
        ))
    }
}
