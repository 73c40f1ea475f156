use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Voice,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Voice => "voice",
        }
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(MessageKind::Text),
            "voice" => Ok(MessageKind::Voice),
            _ => Err(format!("Invalid message kind: {}", s)),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text(String),
    Voice(Vec<u8>),
}

impl MessageContent {
    pub fn kind(&self) -> MessageKind {
        match self {
            MessageContent::Text(_) => MessageKind::Text,
            MessageContent::Voice(_) => MessageKind::Voice,
        }
    }
}

/// A single chat event from a user, already bound to a verified identity.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub user_id: UserId,
    pub content: MessageContent,
}

impl InboundMessage {
    pub fn text(user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            user_id,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn voice(user_id: UserId, audio: Vec<u8>) -> Self {
        Self {
            user_id,
            content: MessageContent::Voice(audio),
        }
    }
}

/// Wire shape of an inbound chat event: `{"type": "text"|"voice", "content": "..."}`.
///
/// Voice content is base64-encoded audio.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundPayload {
    Text { content: String },
    Voice { content: String },
}

impl InboundPayload {
    pub fn into_message(self, user_id: UserId) -> Result<InboundMessage, String> {
        match self {
            InboundPayload::Text { content } => {
                if content.trim().is_empty() {
                    return Err("Message content must not be empty".to_string());
                }
                Ok(InboundMessage::text(user_id, content))
            }
            InboundPayload::Voice { content } => {
                let audio = STANDARD
                    .decode(content.trim())
                    .map_err(|e| format!("Voice content must be base64 audio: {}", e))?;
                Ok(InboundMessage::voice(user_id, audio))
            }
        }
    }
}
