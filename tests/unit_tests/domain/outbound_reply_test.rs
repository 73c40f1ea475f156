use chrono::Utc;
use serde_json::json;

use medassist::domain::{ErrorKind, OutboundReply};

#[test]
fn given_reply_when_serialized_then_is_tagged_with_type() {
    let reply = OutboundReply::Reply {
        content: "Drink water".to_string(),
        urgent: false,
        persisted: true,
        timestamp: Utc::now(),
    };

    let value = serde_json::to_value(&reply).unwrap();

    assert_eq!(value["type"], "reply");
    assert_eq!(value["content"], "Drink water");
    assert_eq!(value["urgent"], false);
    assert_eq!(value["persisted"], true);
    assert!(value["timestamp"].is_string());
}

#[test]
fn given_error_reply_when_serialized_then_carries_kind_and_message() {
    let reply = OutboundReply::error(ErrorKind::TranscriptionError, "Failed to transcribe audio");

    let value = serde_json::to_value(&reply).unwrap();

    assert_eq!(
        value,
        json!({
            "type": "error",
            "kind": "transcription_error",
            "error": "Failed to transcribe audio"
        })
    );
    assert!(reply.is_error());
}

#[test]
fn given_error_kinds_when_displayed_then_match_wire_names() {
    assert_eq!(ErrorKind::UnknownUser.to_string(), "unknown_user");
    assert_eq!(ErrorKind::InvalidToken.to_string(), "invalid_token");
    assert_eq!(ErrorKind::ValidationError.as_str(), "validation_error");
}
