//! Streaming chat channel over WebSocket.
//!
//! The session token travels in the `token` query parameter and is checked
//! before any frame is read. A bad token closes the socket with 1008. Frames
//! go through a bounded queue to one worker task per connection, so a turn
//! that is already in flight still completes and persists after the client
//! goes away; replies for a closed socket are dropped.

use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocketUpgrade, close_code};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::application::services::{AuthError, ChatOrchestrator};
use crate::domain::{ErrorKind, InboundMessage, InboundPayload, OutboundReply, UserId};

#[derive(Debug, Deserialize)]
pub struct SocketParams {
    pub token: Option<String>,
}

pub async fn chat_socket_handler(
    ws: WebSocketUpgrade,
    State(state): State<crate::presentation::state::AppState>,
    Query(params): Query<SocketParams>,
) -> Response {
    let binding = match params.token.as_deref() {
        Some(token) => state.auth_service.verify_token(token),
        None => Err(AuthError::Validation("missing token".to_string())),
    };
    let chatbot = Arc::clone(&state.chatbot);

    ws.on_upgrade(move |socket| async move {
        let (writer, reader) = socket.split();
        run_chat_connection(writer, reader, binding, chatbot).await;
    })
}

/// Frames accepted but not yet handled; reading pauses while this is full.
const INBOUND_QUEUE_DEPTH: usize = 16;
/// Replies waiting for the socket writer.
const OUTBOUND_QUEUE_DEPTH: usize = 16;

/// One parsed frame, or the reason it was rejected.
type QueuedFrame = Result<InboundMessage, String>;

/// Drives one connection until the client disconnects and pending replies are flushed.
///
/// Frames are handled one at a time by a single detached worker, in the order
/// they were read, so a connection never reorders its own history.
pub async fn run_chat_connection<W, R>(
    mut writer: W,
    mut reader: R,
    binding: Result<UserId, AuthError>,
    chatbot: Arc<ChatOrchestrator>,
) where
    W: Sink<Message> + Unpin + Send + 'static,
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let user_id = match binding {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting chat socket");
            let close = Message::Close(Some(CloseFrame {
                code: close_code::POLICY,
                reason: "Invalid token".into(),
            }));
            let _ = writer.send(close).await;
            return;
        }
    };

    tracing::info!(user_id = %user_id, "Chat socket connected");

    let (frame_tx, mut frame_rx) = mpsc::channel::<QueuedFrame>(INBOUND_QUEUE_DEPTH);
    let (reply_tx, mut reply_rx) = mpsc::channel::<OutboundReply>(OUTBOUND_QUEUE_DEPTH);

    let worker = tokio::spawn(async move {
        while let Some(frame) = frame_rx.recv().await {
            let reply = match frame {
                Ok(message) => chatbot.handle_message(message).await,
                Err(error) => OutboundReply::error(ErrorKind::ValidationError, error),
            };
            // A closed socket only drops the reply; the turn is already stored.
            let _ = reply_tx.send(reply).await;
        }
    });

    let writer_task = tokio::spawn(async move {
        while let Some(reply) = reply_rx.recv().await {
            let json = match serde_json::to_string(&reply) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode reply");
                    continue;
                }
            };
            if writer.send(Message::Text(json.into())).await.is_err() {
                tracing::debug!("Chat socket closed, dropping pending replies");
                break;
            }
        }
    });

    while let Some(frame) = reader.next().await {
        let queued = match frame {
            Ok(Message::Text(text)) => parse_text_frame(text.as_str(), user_id),
            Ok(Message::Binary(audio)) => Ok(InboundMessage::voice(user_id, audio.to_vec())),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(error = %e, "Chat socket read failed");
                break;
            }
        };

        if frame_tx.send(queued).await.is_err() {
            tracing::error!(user_id = %user_id, "Chat worker stopped, closing socket");
            break;
        }
    }

    drop(frame_tx);
    if let Err(e) = worker.await {
        tracing::error!(error = %e, "Chat socket worker failed");
    }
    if let Err(e) = writer_task.await {
        tracing::error!(error = %e, "Chat socket writer task failed");
    }
    tracing::info!(user_id = %user_id, "Chat socket disconnected");
}

fn parse_text_frame(text: &str, user_id: UserId) -> Result<InboundMessage, String> {
    let payload: InboundPayload =
        serde_json::from_str(text).map_err(|e| format!("Invalid message: {}", e))?;
    payload.into_message(user_id)
}
