use std::sync::Arc;

use crate::application::ports::{LlmClient, LlmClientError};
use crate::presentation::config::LlmSettings;

use super::{MockLlmClient, OpenAiClient};

pub struct LlmClientFactory;

impl LlmClientFactory {
    pub fn create(settings: &LlmSettings) -> Result<Arc<dyn LlmClient>, LlmClientError> {
        match settings.provider.as_str() {
            "mock" => {
                tracing::warn!("Using offline mock completion provider");
                Ok(Arc::new(MockLlmClient))
            }
            _ => Ok(Arc::new(OpenAiClient::from_settings(settings)?)),
        }
    }
}
