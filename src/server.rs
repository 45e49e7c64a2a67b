use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use tokio::time;
use tracing::warn;

use crate::coordinator::Coordinator;
use crate::protocol::{ClientMessage, Identity};

pub fn router(coordinator: Arc<Coordinator>) -> Router {
    Router::new()
        .route("/signal", get(ws_handler))
        .with_state(coordinator)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(coordinator): State<Arc<Coordinator>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, coordinator))
}

/// One task per connection. Pure translation layer: transport events become
/// coordinator calls, the coordinator's outbound queue becomes socket sends.
/// All validation lives in the coordinator.
async fn handle_socket(socket: WebSocket, coordinator: Arc<Coordinator>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let identity = Identity::generate();

    // Task 1: pump queued coordinator output to the WebSocket, with a
    // keepalive ping so idle connections stay open.
    let send_task = tokio::spawn(async move {
        let mut ping_interval = time::interval(Duration::from_secs(30));
        loop {
            tokio::select! {
                Some(msg) = rx.recv() => {
                    let text = serde_json::to_string(&msg).unwrap();
                    if sender.send(Message::Text(text.into())).await.is_err() { break; }
                }
                _ = ping_interval.tick() => {
                    if sender.send(Message::Ping(vec![].into())).await.is_err() { break; }
                }
            }
        }
    });

    if coordinator.on_connect(identity, tx).is_err() {
        send_task.abort();
        return;
    }

    // Task 2 (this task): receive and dispatch until the peer goes away.
    while let Some(Ok(msg)) = receiver.next().await {
        if let Message::Text(text) = msg {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::CallInitiate { to, offer }) => {
                    let _ = coordinator.on_call_initiate(identity, to, offer);
                }
                Ok(ClientMessage::CallAccept { answer }) => {
                    let _ = coordinator.on_call_accept(identity, answer);
                }
                Ok(ClientMessage::CallEnd {}) => {
                    let _ = coordinator.on_call_end(identity);
                }
                Err(err) => {
                    warn!(%identity, %err, "dropping malformed frame");
                }
            }
        }
    }

    // Socket closed (or errored): same teardown either way.
    let _ = coordinator.on_disconnect(identity);
    send_task.abort();
}
