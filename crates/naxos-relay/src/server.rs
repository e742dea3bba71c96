//! Accept loop and background stats.

use std::time::Duration;

use naxos_presence::PresenceTracker;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::connection::accept_connection;
use crate::gate::Gate;

/// Accept connections forever, one task per peer.
pub async fn serve(listener: TcpListener, gate: Gate, tracker: PresenceTracker) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let gate = gate.clone();
                let tracker = tracker.clone();
                tokio::spawn(async move {
                    accept_connection(stream, addr, gate, tracker).await;
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "TCP accept error");
            }
        }
    }
}

/// Periodically log how many users are online.
pub fn spawn_stats(tracker: PresenceTracker, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let online = tracker.online_count().await;
            tracing::debug!(online, "Stats tick");
        }
    })
}
