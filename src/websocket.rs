use axum::{
    extract::{ws::Message, State, WebSocketUpgrade},
    response::Response,
};
use axum::extract::ws::WebSocket;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::state::AppState;
use crate::translator::TranslateRequest;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let client_uid = Uuid::new_v4().to_string();
    info!("New WebSocket connection: {}", client_uid);

    let (mut sender, mut receiver) = socket.split();

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Some(event) = handle_message(&state, &text).await {
                    if let Err(e) = sender.send(Message::Text(event.to_string())).await {
                        error!("Failed to send to {}: {}", client_uid, e);
                        break;
                    }
                }
            }
            Ok(Message::Close(_)) => {
                info!("Client {} disconnected", client_uid);
                break;
            }
            Err(e) => {
                error!("WebSocket error on {}: {}", client_uid, e);
                break;
            }
            _ => {}
        }
    }

    info!("Closed connection {}", client_uid);
}

/// Processes one inbound message and returns the event to push back, if
/// any. Split out from the socket loop so the protocol is testable without
/// a live connection.
pub async fn handle_message(state: &AppState, text: &str) -> Option<Value> {
    let msg: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            warn!("Unparseable message: {}", e);
            return Some(json!({ "type": "error", "error": "invalid message" }));
        }
    };

    match msg.get("type").and_then(|v| v.as_str()) {
        Some("translate") => Some(handle_translate(state, msg).await),
        other => {
            warn!("Unknown message type: {:?}", other);
            None
        }
    }
}

async fn handle_translate(state: &AppState, msg: Value) -> Value {
    let request: TranslateRequest = match serde_json::from_value(msg) {
        Ok(request) => request,
        Err(e) => {
            warn!("Malformed translate event: {}", e);
            return json!({ "type": "error", "error": "invalid message" });
        }
    };

    // The HTTP path answers blank input with a 400; the channel mirrors
    // that with an error event instead of staying silent.
    if request.text.trim().is_empty() {
        return json!({ "type": "error", "error": "Empty text" });
    }

    match state
        .translator
        .translate(
            &request.text,
            request.source_lang.as_deref(),
            request.target_lang.as_deref(),
        )
        .await
    {
        Ok(translated) => json!({
            "type": "translation_result",
            "translatedText": translated,
        }),
        Err(e) => {
            error!("Translation failed: {}", e);
            json!({ "type": "error", "error": "upstream unavailable" })
        }
    }
}
