//! WebSocket upgrade handler and per-connection message protocol.
//!
//! Protocol (all frames are JSON text):
//!
//! - On connect the server sends `{"type": "welcome", "connId": "..."}`.
//! - The client authenticates with `{"type": "auth", "userId": N,
//!   "token": "..."}`; the token's subject must match `userId`. The server
//!   replies `auth_success` or `auth_error`.
//! - Any other text message is echoed back as
//!   `{"type": "echo", "data": <original>}`.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use atelio_core::types::DbId;

use crate::config::ServerConfig;
use crate::state::AppState;
use crate::ws::manager::WsManager;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection is registered with `WsManager` and
/// managed by two tasks (sender + receiver).
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager, state.config))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager` and sends the welcome frame.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Processes inbound messages on the current task.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>, config: Arc<ServerConfig>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    // Register and get the receiver for outbound messages.
    let mut rx = ws_manager.register(conn_id.clone(), None).await;

    let welcome = serde_json::json!({
        "type": "welcome",
        "connId": conn_id,
    });
    send_json(&ws_manager, &conn_id, welcome).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: process inbound messages.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                ws_manager.note_pong(&conn_id).await;
            }
            Ok(Message::Text(text)) => {
                handle_text_message(&ws_manager, &conn_id, config.as_ref(), text.as_str()).await;
            }
            Ok(_) => {
                // Binary and Ping frames are ignored (axum answers Ping itself).
            }
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove connection and abort sender task.
    ws_manager.unregister(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Dispatch one inbound text frame: auth messages are validated, everything
/// else is echoed back.
async fn handle_text_message(
    ws_manager: &Arc<WsManager>,
    conn_id: &str,
    config: &ServerConfig,
    text: &str,
) {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
        let echo = serde_json::json!({ "type": "echo", "data": text });
        send_json(ws_manager, conn_id, echo).await;
        return;
    };

    if value.get("type").and_then(|t| t.as_str()) == Some("auth") {
        handle_auth_message(ws_manager, conn_id, config, &value).await;
        return;
    }

    let echo = serde_json::json!({ "type": "echo", "data": value });
    send_json(ws_manager, conn_id, echo).await;
}

/// Validate an auth frame and bind the connection to the user on success.
async fn handle_auth_message(
    ws_manager: &Arc<WsManager>,
    conn_id: &str,
    config: &ServerConfig,
    value: &serde_json::Value,
) {
    let user_id = value.get("userId").and_then(|v| v.as_i64());
    let token = value.get("token").and_then(|v| v.as_str());

    let (Some(user_id), Some(token)) = (user_id, token) else {
        let error = serde_json::json!({
            "type": "auth_error",
            "error": "auth requires userId and token",
        });
        send_json(ws_manager, conn_id, error).await;
        return;
    };

    match config.jwt.verify(token) {
        Ok(claims) if claims.sub == user_id as DbId => {
            ws_manager.authenticate(conn_id, claims.sub).await;
            tracing::info!(conn_id = %conn_id, user_id = claims.sub, "WebSocket authenticated");
            let success = serde_json::json!({
                "type": "auth_success",
                "userId": claims.sub,
            });
            send_json(ws_manager, conn_id, success).await;
        }
        _ => {
            let error = serde_json::json!({
                "type": "auth_error",
                "error": "Invalid token",
            });
            send_json(ws_manager, conn_id, error).await;
        }
    }
}

/// Push a JSON value to one connection through its manager channel.
async fn send_json(ws_manager: &Arc<WsManager>, conn_id: &str, value: serde_json::Value) {
    ws_manager
        .push_to_conn(conn_id, Message::Text(value.to_string().into()))
        .await;
}
