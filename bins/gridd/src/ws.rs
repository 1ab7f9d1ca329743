//! `GET /ws`: upgrades to a websocket that streams `grid-sync` broadcast
//! events as JSON text frames, generalizing
//! `echo-session-ws-gateway`'s split-socket-plus-writer-task pattern without
//! its Unix-socket bridging half (`gridd` has no upstream process to relay
//! to; the fabric *is* the upstream).

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::{debug, warn};

use crate::state::AppState;

/// `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(app): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, app))
}

async fn handle_socket(mut socket: WebSocket, app: AppState) {
    let (conn_id, mut rx) = app.fabric.subscribe();
    debug!(conn_id, "websocket subscriber connected");

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                let Ok(encoded) = serde_json::to_string(&event) else { continue };
                if socket.send(Message::Text(encoded.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        // This channel is read-only from the client's side; actions go
                        // through `POST /agents/:id/actions`. Any inbound frame is ignored.
                    }
                    Some(Err(err)) => {
                        warn!(conn_id, %err, "websocket read error");
                        break;
                    }
                }
            }
        }
    }

    app.fabric.unsubscribe(conn_id);
    debug!(conn_id, "websocket subscriber disconnected");
}
