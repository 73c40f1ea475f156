use std::sync::Arc;

use serde::Deserialize;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::presentation::config::TranscriptionSettings;

use super::azure_whisper_engine::AzureWhisperEngine;
use super::mock_transcription_engine::MockTranscriptionEngine;
use super::openai_whisper_engine::OpenAiWhisperEngine;

const DEFAULT_AZURE_API_VERSION: &str = "2024-02-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionProvider {
    #[serde(rename = "openai")]
    OpenAi,
    Azure,
    Mock,
}

pub struct TranscriptionEngineFactory;

impl TranscriptionEngineFactory {
    pub fn create(
        settings: &TranscriptionSettings,
    ) -> Result<Arc<dyn TranscriptionEngine>, TranscriptionError> {
        match settings.provider {
            TranscriptionProvider::Mock => {
                tracing::warn!("Using offline mock transcription engine");
                Ok(Arc::new(MockTranscriptionEngine))
            }
            TranscriptionProvider::OpenAi => {
                let key = settings.api_key.clone().ok_or_else(|| {
                    TranscriptionError::Configuration(
                        "API key required for OpenAI Whisper".to_string(),
                    )
                })?;
                let engine = OpenAiWhisperEngine::new(
                    key,
                    settings.base_url.clone(),
                    Some(settings.model.clone()),
                );
                Ok(Arc::new(engine))
            }
            TranscriptionProvider::Azure => {
                let (Some(base_url), Some(key)) = (&settings.base_url, &settings.api_key) else {
                    return Err(TranscriptionError::Configuration(
                        "base_url and api_key required for Azure Whisper".to_string(),
                    ));
                };
                let engine = AzureWhisperEngine::new(
                    base_url,
                    &settings.model,
                    key,
                    settings
                        .azure_api_version
                        .as_deref()
                        .unwrap_or(DEFAULT_AZURE_API_VERSION),
                );
                Ok(Arc::new(engine))
            }
        }
    }
}
