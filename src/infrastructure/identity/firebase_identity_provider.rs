use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{IdentityError, IdentityProvider};
use crate::domain::IdentityId;

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Email/password accounts backed by the Firebase Identity Toolkit REST API.
pub struct FirebaseIdentityProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseIdentityProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
        }
    }

    async fn call(
        &self,
        action: &str,
        email: &str,
        password: &str,
    ) -> Result<IdentityId, IdentityError> {
        let url = format!("{}/accounts:{}?key={}", self.base_url, action, self.api_key);

        let response = self
            .client
            .post(&url)
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let account: AccountResponse = response
                .json()
                .await
                .map_err(|e| IdentityError::Unavailable(format!("parse response: {}", e)))?;
            return Ok(IdentityId::new(account.local_id));
        }

        if status.is_server_error() {
            return Err(IdentityError::Unavailable(format!("status {}", status)));
        }

        let code = response
            .json::<ErrorEnvelope>()
            .await
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| format!("status {}", status));

        tracing::debug!(action, code = %code, "Identity provider rejected request");
        Err(map_error_code(&code))
    }
}

/// Maps an Identity Toolkit error code such as `EMAIL_EXISTS` to an [`IdentityError`].
pub fn map_error_code(code: &str) -> IdentityError {
    let head = code.split([' ', ':']).next().unwrap_or(code);
    match head {
        "EMAIL_EXISTS" => IdentityError::EmailExists,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            IdentityError::InvalidCredentials
        }
        _ => IdentityError::Rejected(code.to_string()),
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<IdentityId, IdentityError> {
        self.call("signUp", email, password).await
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityId, IdentityError> {
        self.call("signInWithPassword", email, password).await
    }
}
