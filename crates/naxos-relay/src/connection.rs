//! Per-connection handler: gate the handshake, register, wait for close.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use naxos_common::{new_correlation_id, UserId};
use naxos_presence::PresenceTracker;
use tokio::net::TcpStream;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::gate::{self, Gate};

/// Run the WebSocket handshake on `stream` and, if the gate admits it,
/// track the connection until it closes.
pub async fn accept_connection(
    stream: TcpStream,
    addr: SocketAddr,
    gate: Gate,
    tracker: PresenceTracker,
) {
    let conn = new_correlation_id();
    let mut admitted: Option<UserId> = None;

    // Returning an error response here aborts the handshake; the peer is
    // never upgraded and never reaches the tracker.
    let callback = |request: &Request, response: Response| match gate.admit(request.headers()) {
        Ok(user) => {
            admitted = Some(user);
            Ok(response)
        }
        Err(e) => {
            tracing::warn!(conn = %conn, peer = %addr, error = %e, "Handshake rejected");
            Err(gate::reject(&e))
        }
    };

    let ws = match accept_hdr_async(stream, callback).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::debug!(conn = %conn, peer = %addr, error = %e, "WS handshake failed");
            return;
        }
    };

    if let Some(user) = admitted {
        handle_connection(ws, user, &conn, addr, tracker).await;
    }
}

/// Track an admitted connection until the peer goes away.
pub async fn handle_connection(
    ws: WebSocketStream<TcpStream>,
    user: UserId,
    conn: &str,
    addr: SocketAddr,
    tracker: PresenceTracker,
) {
    let (mut sink, mut stream) = ws.split();

    let arrival = tracker.connect(&user).await;
    tracing::info!(
        conn = %conn,
        peer = %addr,
        user = %user,
        arrival = ?arrival,
        "Client connected"
    );

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Ping(data)) => {
                if sink.send(Message::Pong(data)).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            // Payloads carry no presence meaning.
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn = %conn, peer = %addr, error = %e, "WS error");
                break;
            }
        }
    }

    tracker.disconnect(&user).await;
    tracing::info!(conn = %conn, peer = %addr, user = %user, "Client disconnected");
}
