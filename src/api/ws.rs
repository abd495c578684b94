//! WebSocket endpoint for order notifications.
//!
//! Push-only: inbound frames are read solely to detect closure. A dropped
//! connection cannot be resurrected; the client reconnects and gets a
//! fresh registration.

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::hub::{Hub, Registration};

/// Ping cadence. Bounds how long a silently-dead peer can occupy a
/// registry slot before the failed ping tears it down.
const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct WsState {
    pub hub: Arc<Hub>,
}

pub fn router(state: WsState) -> Router {
    Router::new().route("/", get(ws_handler)).with_state(state)
}

async fn ws_handler(State(state): State<WsState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.hub))
}

async fn handle_socket(socket: WebSocket, hub: Arc<Hub>) {
    let (mut sender, mut receiver) = socket.split();
    let Registration { id, mut rx } = hub.register();
    info!(conn = %id, "notification client connected");

    // Writer: drains this connection's queue and keeps the peer alive.
    let mut send_task = tokio::spawn(async move {
        let mut ping = tokio::time::interval(PING_INTERVAL);
        ping.tick().await; // first tick fires immediately
        loop {
            tokio::select! {
                msg = rx.recv() => match msg {
                    Some(text) => {
                        if sender.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    // Sender dropped: the hub evicted us.
                    None => break,
                },
                _ = ping.tick() => {
                    if sender.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Liveness loop: terminates on any read error or peer close.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {},
        _ = &mut recv_task => {},
    }

    send_task.abort();
    recv_task.abort();
    hub.unregister(id);
    info!(conn = %id, "notification client disconnected");
}
