//! Live preview over WebSocket.
//!
//! Each connection owns a [`Session`]. Client `input` and `options` messages
//! feed it; its updates come back as `validation`, `image` and `cleared`
//! messages.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use image_engine::RenderRequest;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::app::SharedState;
use crate::services::download;
use crate::services::notification::Notification;
use crate::services::pipeline::ImageEffect;
use crate::services::session::{Session, SessionUpdate};

const OUTBOUND_CAPACITY: usize = 32;

/// Largest client frame accepted. Input text is capped well below this.
const MAX_MESSAGE_BYTES: usize = 256 * 1024;

/// Messages accepted from the page.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Input { text: String },
    Options(RenderRequest),
    Ping,
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.max_message_size(MAX_MESSAGE_BYTES)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    let (mut sender, mut receiver) = socket.split();

    let client_id = uuid::Uuid::new_v4().to_string();
    let session_config = state.session_config();
    let welcome = event(
        "connected",
        json!({ "clientId": client_id, "options": session_config.defaults }),
        Utc::now(),
    );
    if sender
        .send(Message::Text(welcome.to_string().into()))
        .await
        .is_err()
    {
        return;
    }

    tracing::info!("WebSocket client connected: {}", client_id);

    let cancel = state.shutdown_token().child_token();
    let (session, mut updates) = Session::spawn(session_config, cancel.clone());
    let (out_tx, mut out_rx) = mpsc::channel::<Value>(OUTBOUND_CAPACITY);

    // Forward session updates and direct replies to this client
    let mut send_task = tokio::spawn(async move {
        loop {
            let messages = tokio::select! {
                update = updates.recv() => match update {
                    Some(update) => update_messages(&update, Utc::now()),
                    None => break,
                },
                reply = out_rx.recv() => match reply {
                    Some(reply) => vec![reply],
                    None => break,
                },
            };
            for msg in messages {
                if sender.send(Message::Text(msg.to_string().into())).await.is_err() {
                    return;
                }
            }
        }
    });

    // Receive messages from this client and feed the session
    let cid = client_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    if let Some(reply) = handle_client_message(&text, &session) {
                        if out_tx.send(reply).await.is_err() {
                            break;
                        }
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
        tracing::info!("WebSocket client disconnected: {}", cid);
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
    cancel.cancel();
}

/// Apply one client message. Returns a direct reply, if any.
fn handle_client_message(text: &str, session: &Session) -> Option<Value> {
    match parse_client_message(text) {
        Ok(ClientMessage::Input { text }) => {
            let revision = session.set_text(text);
            tracing::trace!(revision, "Input received");
            None
        }
        Ok(ClientMessage::Options(request)) => {
            let revision = session.set_options(request);
            tracing::trace!(revision, "Options received");
            None
        }
        Ok(ClientMessage::Ping) => Some(json!({ "type": "pong" })),
        Err(message) => {
            tracing::debug!("Ignoring client message: {message}");
            Some(notification_event(&Notification::error(message), Utc::now()))
        }
    }
}

/// Parse a client message. The error is a user-facing notification text.
pub fn parse_client_message(text: &str) -> Result<ClientMessage, &'static str> {
    let value: Value = serde_json::from_str(text).map_err(|_| "Invalid message")?;
    let is_options = value.get("type").and_then(Value::as_str) == Some("options");
    serde_json::from_value(value).map_err(|_| {
        if is_options {
            "Invalid QR code options"
        } else {
            "Unsupported message"
        }
    })
}

fn event(kind: &str, data: Value, at: DateTime<Utc>) -> Value {
    json!({
        "type": kind,
        "data": data,
        "timestamp": at.to_rfc3339(),
    })
}

pub fn notification_event(notification: &Notification, at: DateTime<Utc>) -> Value {
    event("notification", json!(notification), at)
}

/// Messages sent to the page for one session update.
pub fn update_messages(update: &SessionUpdate, at: DateTime<Utc>) -> Vec<Value> {
    let generation = &update.generation;
    let outcome = generation.outcome;

    let mut messages = vec![event(
        "validation",
        json!({
            "revision": update.revision,
            "severity": outcome.severity(),
            "code": outcome.code(),
            "message": outcome.message(),
        }),
        at,
    )];

    match &generation.effect {
        ImageEffect::Replace(image) => messages.push(event(
            "image",
            json!({
                "revision": update.revision,
                "image": image.data_url,
                "input": generation.input,
                "options": generation.options,
                "width": image.width,
                "height": image.height,
                "filename": download::filename_at(at),
            }),
            at,
        )),
        ImageEffect::Clear => messages.push(event(
            "cleared",
            json!({ "revision": update.revision }),
            at,
        )),
        ImageEffect::Keep => {}
    }

    messages
}
