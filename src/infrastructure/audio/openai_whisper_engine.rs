use async_trait::async_trait;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};

use super::whisper_http;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "whisper-1";

/// OpenAI `/audio/transcriptions`, asking for a plain-text body.
pub struct OpenAiWhisperEngine {
    client: reqwest::Client,
    api_key: String,
    url: String,
    model: String,
}

impl OpenAiWhisperEngine {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        let base = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            client: reqwest::Client::new(),
            api_key,
            url: format!("{}/audio/transcriptions", base.trim_end_matches('/')),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl TranscriptionEngine for OpenAiWhisperEngine {
    async fn transcribe(&self, audio_data: &[u8]) -> Result<String, TranscriptionError> {
        let (form, format) = whisper_http::audio_form(audio_data)?;
        let form = form
            .text("model", self.model.clone())
            .text("response_format", "text");

        tracing::debug!(model = %self.model, ?format, bytes = audio_data.len(), "Uploading clip to Whisper");

        let transcript = whisper_http::send(
            self.client
                .post(&self.url)
                .bearer_auth(&self.api_key)
                .multipart(form),
        )
        .await?
        .text()
        .await
        .map_err(|e| TranscriptionError::ApiRequestFailed(format!("body: {}", e)))?;

        let transcript = transcript.trim().to_string();
        tracing::info!(chars = transcript.chars().count(), "Whisper transcript received");
        Ok(transcript)
    }
}
