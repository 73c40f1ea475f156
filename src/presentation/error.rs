//! HTTP error responses.
//!
//! Every handler failure becomes an [`ApiError`], rendered as
//! `{"error": "<message>"}`. Server-side failures are logged here and reach
//! the client only as a generic message.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::{IdentityError, RepositoryError};
use crate::application::services::{AuthError, TranscriptionServiceError};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// Missing or unreadable credentials.
    Unauthorized(String),
    /// Credentials were presented but are not valid.
    Forbidden(String),
    NotFound(String),
    BadGateway(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::BadGateway(msg) => msg,
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal server error");
                "Internal server error".to_string()
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => ApiError::BadRequest(msg),
            AuthError::EmailTaken => ApiError::BadRequest("Email already registered".to_string()),
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            AuthError::InvalidToken(_) => {
                ApiError::Forbidden("Invalid or expired token".to_string())
            }
            AuthError::Provider(IdentityError::Rejected(msg)) => ApiError::BadRequest(msg),
            AuthError::Provider(e) => {
                tracing::error!(error = %e, "Identity provider failure");
                ApiError::BadGateway("Identity provider unavailable".to_string())
            }
            AuthError::Storage(e) => ApiError::Internal(e.to_string()),
            AuthError::TokenIssue(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<TranscriptionServiceError> for ApiError {
    fn from(err: TranscriptionServiceError) -> Self {
        if err.is_validation() {
            return ApiError::BadRequest(err.to_string());
        }
        tracing::error!(error = %err, "Transcription failed");
        ApiError::BadGateway("Failed to transcribe audio".to_string())
    }
}
