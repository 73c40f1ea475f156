use std::time::Duration;

use axum::extract::ws::{Message, close_code};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::StreamExt;
use futures::channel::mpsc;
use futures::stream;
use serde_json::Value;

use medassist::application::ports::TokenError;
use medassist::application::services::AuthError;
use medassist::presentation::handlers::run_chat_connection;

use crate::helpers::{ChatHarness, FixedTranscriptionEngine, HarnessConfig, ScriptedLlmClient};

fn text_frame(json: &str) -> Result<Message, axum::Error> {
    Ok(Message::Text(json.to_string().into()))
}

async fn collect_replies(rx: mpsc::UnboundedReceiver<Message>) -> Vec<Value> {
    rx.filter_map(|message| async move {
        match message {
            Message::Text(text) => serde_json::from_str(text.as_str()).ok(),
            _ => None,
        }
    })
    .collect()
    .await
}

#[tokio::test]
async fn given_invalid_token_when_connecting_then_closes_with_policy_violation() {
    let harness = ChatHarness::new().await;
    let (tx, mut rx) = mpsc::unbounded();
    let reader = stream::iter(vec![text_frame(r#"{"type":"text","content":"hello"}"#)]);

    run_chat_connection(
        tx,
        reader,
        Err(AuthError::InvalidToken(TokenError::Expired)),
        harness.chatbot.clone(),
    )
    .await;

    match rx.next().await {
        Some(Message::Close(Some(frame))) => assert_eq!(frame.code, close_code::POLICY),
        other => panic!("expected close frame, got {:?}", other),
    }
    assert!(rx.next().await.is_none());
    assert_eq!(harness.llm.call_count(), 0);
}

#[tokio::test]
async fn given_valid_binding_when_text_frames_arrive_then_each_gets_a_reply() {
    let harness = ChatHarness::new().await;
    let (tx, rx) = mpsc::unbounded();
    let reader = stream::iter(vec![
        text_frame(r#"{"type":"text","content":"first"}"#),
        text_frame(r#"{"type":"text","content":"second"}"#),
    ]);

    run_chat_connection(tx, reader, Ok(harness.user.id), harness.chatbot.clone()).await;

    let replies = collect_replies(rx).await;
    assert_eq!(replies.len(), 2);
    assert!(replies.iter().all(|r| r["type"] == "reply"));
    assert_eq!(harness.store.turns_for(harness.user.id).await.len(), 2);
}

#[tokio::test]
async fn given_voice_frame_when_received_then_reply_is_based_on_transcript() {
    let harness = ChatHarness::new().await;
    let (tx, rx) = mpsc::unbounded();
    let audio = STANDARD.encode(b"RIFF....WAVE");
    let reader = stream::iter(vec![text_frame(&format!(
        r#"{{"type":"voice","content":"{audio}"}}"#
    ))]);

    run_chat_connection(tx, reader, Ok(harness.user.id), harness.chatbot.clone()).await;

    let replies = collect_replies(rx).await;
    assert_eq!(replies[0]["content"], "Reply to: I have a mild headache");
}

#[tokio::test]
async fn given_malformed_frame_when_received_then_replies_with_validation_error() {
    let harness = ChatHarness::new().await;
    let (tx, rx) = mpsc::unbounded();
    let reader = stream::iter(vec![text_frame("not json at all")]);

    run_chat_connection(tx, reader, Ok(harness.user.id), harness.chatbot.clone()).await;

    let replies = collect_replies(rx).await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["type"], "error");
    assert_eq!(replies[0]["kind"], "validation_error");
    assert_eq!(harness.llm.call_count(), 0);
}

#[tokio::test]
async fn given_client_gone_when_turn_completes_then_turn_is_still_persisted() {
    let harness = ChatHarness::with_config(HarnessConfig {
        llm: ScriptedLlmClient::new().with_delay(Duration::from_millis(30)),
        ..HarnessConfig::default()
    })
    .await;
    let (tx, rx) = mpsc::unbounded();
    drop(rx);
    let reader = stream::iter(vec![text_frame(r#"{"type":"text","content":"still there?"}"#)]);

    run_chat_connection(tx, reader, Ok(harness.user.id), harness.chatbot.clone()).await;

    let turns = harness.store.turns_for(harness.user.id).await;
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].input_text, "still there?");
    assert_eq!(harness.sessions.get(harness.user.id).await.len(), 2);
}

#[tokio::test]
async fn given_close_frame_when_received_then_stops_reading_further_frames() {
    let harness = ChatHarness::new().await;
    let (tx, rx) = mpsc::unbounded();
    let reader = stream::iter(vec![
        Ok(Message::Close(None)),
        text_frame(r#"{"type":"text","content":"after close"}"#),
    ]);

    run_chat_connection(tx, reader, Ok(harness.user.id), harness.chatbot.clone()).await;

    assert!(collect_replies(rx).await.is_empty());
    assert_eq!(harness.llm.call_count(), 0);
}

#[tokio::test]
async fn given_slow_voice_frame_then_text_frame_when_handled_then_history_keeps_send_order() {
    let harness = ChatHarness::with_config(HarnessConfig {
        engine: FixedTranscriptionEngine::new("first (voice)")
            .with_delay(Duration::from_millis(100)),
        ..HarnessConfig::default()
    })
    .await;
    let (tx, rx) = mpsc::unbounded();
    let reader = stream::iter(vec![
        Ok(Message::Binary(b"RIFF....WAVE".to_vec().into())),
        text_frame(r#"{"type":"text","content":"second (text)"}"#),
    ]);

    run_chat_connection(tx, reader, Ok(harness.user.id), harness.chatbot.clone()).await;

    let history: Vec<String> = harness
        .sessions
        .get(harness.user.id)
        .await
        .messages()
        .map(|m| m.content.clone())
        .collect();
    assert_eq!(
        history,
        vec![
            "first (voice)",
            "Reply to: first (voice)",
            "second (text)",
            "Reply to: second (text)",
        ]
    );

    let replies = collect_replies(rx).await;
    let contents: Vec<_> = replies.iter().map(|r| r["content"].as_str().unwrap()).collect();
    assert_eq!(contents, vec!["Reply to: first (voice)", "Reply to: second (text)"]);
}

#[tokio::test]
async fn given_burst_larger_than_queue_when_handled_then_every_frame_is_answered_in_order() {
    let harness = ChatHarness::with_config(HarnessConfig {
        history_capacity: 100,
        ..HarnessConfig::default()
    })
    .await;
    let (tx, rx) = mpsc::unbounded();
    let frames: Vec<_> = (0..40)
        .map(|i| text_frame(&format!(r#"{{"type":"text","content":"message {i}"}}"#)))
        .collect();

    run_chat_connection(tx, stream::iter(frames), Ok(harness.user.id), harness.chatbot.clone())
        .await;

    let replies = collect_replies(rx).await;
    assert_eq!(replies.len(), 40);
    for (i, reply) in replies.iter().enumerate() {
        assert_eq!(reply["content"], format!("Reply to: message {i}"));
    }
    assert_eq!(harness.store.turns_for(harness.user.id).await.len(), 40);
}

#[tokio::test]
async fn given_rejected_frame_between_valid_ones_when_handled_then_error_reply_keeps_its_position() {
    let harness = ChatHarness::new().await;
    let (tx, rx) = mpsc::unbounded();
    let reader = stream::iter(vec![
        text_frame(r#"{"type":"text","content":"one"}"#),
        text_frame("garbage"),
        text_frame(r#"{"type":"text","content":"two"}"#),
    ]);

    run_chat_connection(tx, reader, Ok(harness.user.id), harness.chatbot.clone()).await;

    let kinds: Vec<_> = collect_replies(rx)
        .await
        .iter()
        .map(|r| r["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds, vec!["reply", "error", "reply"]);
}
