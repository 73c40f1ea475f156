use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use medassist::domain::{InboundPayload, MessageContent, MessageKind, UserId};

#[test]
fn given_text_payload_when_parsed_then_builds_text_message() {
    let user_id = UserId::new();
    let payload: InboundPayload =
        serde_json::from_str(r#"{"type": "text", "content": "I feel dizzy"}"#).unwrap();

    let message = payload.into_message(user_id).unwrap();

    assert_eq!(message.user_id, user_id);
    assert_eq!(message.content.kind(), MessageKind::Text);
    assert!(matches!(message.content, MessageContent::Text(ref t) if t == "I feel dizzy"));
}

#[test]
fn given_voice_payload_when_parsed_then_decodes_base64_audio() {
    let encoded = STANDARD.encode(b"RIFF fake wav");
    let json = format!(r#"{{"type": "voice", "content": "{encoded}"}}"#);
    let payload: InboundPayload = serde_json::from_str(&json).unwrap();

    let message = payload.into_message(UserId::new()).unwrap();

    assert!(matches!(message.content, MessageContent::Voice(ref a) if a == b"RIFF fake wav"));
}

#[test]
fn given_blank_text_when_converted_then_returns_error() {
    let payload: InboundPayload =
        serde_json::from_str(r#"{"type": "text", "content": "   "}"#).unwrap();

    assert!(payload.into_message(UserId::new()).is_err());
}

#[test]
fn given_invalid_base64_voice_when_converted_then_returns_error() {
    let payload: InboundPayload =
        serde_json::from_str(r#"{"type": "voice", "content": "not base64!!"}"#).unwrap();

    assert!(payload.into_message(UserId::new()).is_err());
}

#[test]
fn given_unknown_type_when_parsed_then_fails() {
    let result = serde_json::from_str::<InboundPayload>(r#"{"type": "video", "content": "x"}"#);

    assert!(result.is_err());
}
