use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};

use super::whisper_http;

/// Whisper deployment hosted on Azure OpenAI; authenticates with the `api-key` header.
pub struct AzureWhisperEngine {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct TranscriptionBody {
    text: String,
}

impl AzureWhisperEngine {
    pub fn new(base_url: &str, deployment: &str, api_key: &str, api_version: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!(
                "{}/openai/deployments/{}/audio/transcriptions?api-version={}",
                base_url.trim_end_matches('/'),
                deployment,
                api_version,
            ),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl TranscriptionEngine for AzureWhisperEngine {
    async fn transcribe(&self, audio_data: &[u8]) -> Result<String, TranscriptionError> {
        let (form, format) = whisper_http::audio_form(audio_data)?;

        tracing::debug!(?format, bytes = audio_data.len(), "Uploading clip to Azure Whisper deployment");

        let body: TranscriptionBody = whisper_http::send(
            self.client
                .post(&self.url)
                .header("api-key", &self.api_key)
                .multipart(form),
        )
        .await?
        .json()
        .await
        .map_err(|e| TranscriptionError::TranscriptionFailed(format!("parse response: {}", e)))?;

        let transcript = body.text.trim().to_string();
        tracing::info!(chars = transcript.chars().count(), "Azure Whisper transcript received");
        Ok(transcript)
    }
}
