use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Client-facing error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AuthError,
    InvalidToken,
    UnknownUser,
    TranscriptionError,
    GenerationError,
    PersistenceError,
    ValidationError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AuthError => "auth_error",
            ErrorKind::InvalidToken => "invalid_token",
            ErrorKind::UnknownUser => "unknown_user",
            ErrorKind::TranscriptionError => "transcription_error",
            ErrorKind::GenerationError => "generation_error",
            ErrorKind::PersistenceError => "persistence_error",
            ErrorKind::ValidationError => "validation_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shaped response for one inbound message, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundReply {
    Reply {
        content: String,
        urgent: bool,
        persisted: bool,
        timestamp: DateTime<Utc>,
    },
    Error {
        kind: ErrorKind,
        error: String,
    },
}

impl OutboundReply {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        OutboundReply::Error {
            kind,
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, OutboundReply::Error { .. })
    }
}
