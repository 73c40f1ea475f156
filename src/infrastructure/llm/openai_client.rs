use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{CompletionPrompt, LlmClient, LlmClientError};
use crate::presentation::config::LlmSettings;

const DEFAULT_AZURE_API_VERSION: &str = "2024-02-01";

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct OpenAiClient {
    client: Client,
    provider: String,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmClientError> {
        let endpoint = match settings.provider.as_str() {
            "openai" => format!(
                "{}/chat/completions",
                settings
                    .base_url
                    .as_deref()
                    .unwrap_or("https://api.openai.com/v1")
                    .trim_end_matches('/')
            ),
            "lmstudio" => {
                let base_url = settings.base_url.as_deref().ok_or_else(|| {
                    LlmClientError::Configuration(
                        "base_url required for lmstudio provider".to_string(),
                    )
                })?;
                format!("{}/chat/completions", base_url.trim_end_matches('/'))
            }
            "azure" => {
                let endpoint = settings.azure_endpoint.as_deref().ok_or_else(|| {
                    LlmClientError::Configuration(
                        "azure_endpoint required for azure provider".to_string(),
                    )
                })?;
                format!(
                    "{}/openai/deployments/{}/chat/completions?api-version={}",
                    endpoint.trim_end_matches('/'),
                    settings.chat_model,
                    settings
                        .azure_api_version
                        .as_deref()
                        .unwrap_or(DEFAULT_AZURE_API_VERSION)
                )
            }
            other => {
                return Err(LlmClientError::Configuration(format!(
                    "unknown provider: {}",
                    other
                )));
            }
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| LlmClientError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            provider: settings.provider.clone(),
            endpoint,
            api_key: settings.api_key.clone(),
            model: settings.chat_model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
        })
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.provider == "azure" {
            request.header("api-key", &self.api_key)
        } else if self.api_key.is_empty() {
            request
        } else {
            request.bearer_auth(&self.api_key)
        }
    }
}

fn wire_messages(prompt: &CompletionPrompt) -> Vec<WireMessage<'_>> {
    std::iter::once(WireMessage {
        role: "system",
        content: &prompt.system,
    })
    .chain(prompt.messages.iter().map(|m| WireMessage {
        role: m.role.as_str(),
        content: &m.content,
    }))
    .collect()
}

#[async_trait]
impl LlmClient for OpenAiClient {
    #[tracing::instrument(skip(self, prompt), fields(model = %self.model, messages = prompt.messages.len()))]
    async fn complete(&self, prompt: &CompletionPrompt) -> Result<String, LlmClientError> {
        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages: wire_messages(prompt),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let request = self.client.post(&self.endpoint).json(&request_body);
        let response = self
            .apply_auth(request)
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmClientError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmClientError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let completion_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        completion_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmClientError::InvalidResponse("empty choices".to_string()))
    }
}
