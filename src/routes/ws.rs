//! WebSocket handler: notification channel subscription.
//!
//! DESIGN
//! ======
//! The receiver is taken from the hub before the upgrade completes, so a
//! client sees every notification published after its handshake. On upgrade
//! the connection enters a `select!` loop:
//! - Hub notifications for the subscribed channel → JSON text to the client
//! - Client close (or socket error) → end the subscription
//!
//! Inbound text/binary from the client is ignored; this is a read-only feed.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use uuid::Uuid;

use crate::notify::{BOARDS_CHANNEL, Notification};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubscribeParams {
    pub channel: Option<String>,
}

pub async fn handle_ws(
    State(state): State<AppState>,
    Query(params): Query<SubscribeParams>,
    ws: WebSocketUpgrade,
) -> Response {
    let channel = params.channel.unwrap_or_else(|| BOARDS_CHANNEL.to_owned());
    if channel != BOARDS_CHANNEL {
        return (StatusCode::NOT_FOUND, "unknown channel").into_response();
    }

    let rx = state.hub.subscribe();
    let subscribers = state.hub.subscriber_count();
    ws.on_upgrade(move |socket| run_ws(socket, rx, channel, subscribers))
}

async fn run_ws(
    mut socket: WebSocket,
    mut rx: broadcast::Receiver<Notification>,
    channel: String,
    subscribers: usize,
) {
    let client_id = Uuid::new_v4();
    info!(%client_id, %channel, subscribers, "ws: subscriber connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    None | Some(Err(_) | Ok(Message::Close(_))) => break,
                    Some(Ok(_)) => {}
                }
            }
            received = rx.recv() => {
                match received {
                    Ok(notification) => {
                        if notification.channel != channel {
                            continue;
                        }
                        if send_notification(&mut socket, &notification).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(%client_id, skipped, "ws: subscriber lagged; notifications dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    info!(%client_id, "ws: subscriber disconnected");
}

async fn send_notification(socket: &mut WebSocket, notification: &Notification) -> Result<(), axum::Error> {
    let text = match serde_json::to_string(notification) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, event = %notification.event, "ws: notification encode failed; skipping");
            return Ok(());
        }
    };
    socket.send(Message::Text(text.into())).await
}
