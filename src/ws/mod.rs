pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use chrono::Utc;
use futures::{
    sink::Sink,
    stream::{Stream, StreamExt},
};
use std::sync::Arc;

use crate::error::TransportError;
use crate::registry::{Connection, ConnectionManager};
use crate::state::AppState;
use crate::types::Disconnect;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    tracing::info!("WebSocket connection request");

    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, receiver) = socket.split();
    // Outcome is already logged; nothing above the task can act on it
    let _ = serve_connection(sender, receiver, &state.connections).await;
}

/// Run one session from accept to cleanup.
///
/// The connection is tracked for as long as the echo loop runs and is
/// removed exactly once afterwards, whether the peer closed cleanly or the
/// transport failed.
pub async fn serve_connection<Tx, Rx>(
    sender: Tx,
    mut receiver: Rx,
    registry: &ConnectionManager,
) -> Result<Disconnect, TransportError>
where
    Tx: Sink<Message, Error = axum::Error> + Send + 'static,
    Rx: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let connection = Arc::new(Connection::new(sender));
    let conn_id = connection.id();
    registry.add(connection.clone()).await;

    let active = registry.len().await;
    tracing::info!(conn_id = %conn_id, active, "WebSocket connected");

    let outcome = handlers::run_echo_loop(&mut receiver, &connection, registry).await;

    let lifetime_secs = (Utc::now() - connection.connected_at()).num_seconds();
    match &outcome {
        Ok(Disconnect::Closed { code, reason }) => {
            tracing::info!(conn_id = %conn_id, ?code, reason = %reason, lifetime_secs, "WebSocket closed by peer");
        }
        Ok(Disconnect::StreamEnded) => {
            tracing::info!(conn_id = %conn_id, lifetime_secs, "WebSocket stream ended");
        }
        Err(e) => {
            tracing::warn!(conn_id = %conn_id, error = %e, lifetime_secs, "WebSocket dropped");
        }
    }

    if let Err(e) = registry.remove(conn_id).await {
        tracing::error!(conn_id = %conn_id, error = %e, "Registry cleanup failed");
    }

    let active = registry.len().await;
    tracing::info!(conn_id = %conn_id, active, "WebSocket connection closed");
    outcome
}
