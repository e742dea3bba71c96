//! Shared presence tracker used by connection handlers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use naxos_common::{PresenceStatus, UserId};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::notifier::Notifier;
use crate::scheduler::OfflineScheduler;
use crate::table::{Arrival, OfflineTicket, PresenceTable};

/// Table plus the most recent backend call per user.
///
/// Both live behind the same lock so calls are queued in the order the
/// table changed.
#[derive(Default)]
struct State {
    table: PresenceTable,
    calls: HashMap<UserId, JoinHandle<()>>,
}

/// Thread-safe presence tracker.
///
/// Every table mutation goes through one mutex, so connects, disconnects
/// and offline checks for a user are applied in a single order. Backend
/// notifications run on their own tasks and never hold the lock; calls for
/// the same user are delivered one after another.
#[derive(Clone)]
pub struct PresenceTracker {
    state: Arc<Mutex<State>>,
    notifier: Arc<dyn Notifier>,
    scheduler: OfflineScheduler,
}

impl PresenceTracker {
    pub fn new(notifier: Arc<dyn Notifier>, debounce: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            notifier,
            scheduler: OfflineScheduler::new(debounce),
        }
    }

    /// Register an admitted connection.
    pub async fn connect(&self, user: &UserId) -> Arrival {
        let mut state = self.state.lock().await;
        let arrival = state.table.connect(user);

        match arrival {
            Arrival::CameOnline => {
                info!(user = %user, "User online");
                self.dispatch(&mut state, user.clone(), PresenceStatus::Connected);
            }
            Arrival::Resumed => {
                debug!(user = %user, "Reconnected inside debounce window");
            }
            Arrival::Additional => {
                let connections = state.table.connections(user);
                debug!(user = %user, connections, "Additional connection");
            }
        }
        arrival
    }

    /// Register a closed connection. If it was the user's last one, an
    /// offline check is armed for after the debounce window.
    pub async fn disconnect(&self, user: &UserId) {
        let ticket = self.state.lock().await.table.disconnect(user);

        if let Some(ticket) = ticket {
            debug!(
                user = %user,
                delay_ms = self.scheduler.delay().as_millis() as u64,
                "Last connection closed, offline check armed"
            );
            let tracker = self.clone();
            self.scheduler.schedule(async move {
                tracker.offline_check(ticket).await;
            });
        }
    }

    /// Settle a deferred disconnect. Returns `true` if the user went offline.
    pub async fn offline_check(&self, ticket: OfflineTicket) -> bool {
        let mut state = self.state.lock().await;
        let offline = state.table.offline_check(&ticket);

        if offline {
            info!(user = %ticket.user, "User offline");
            self.dispatch(&mut state, ticket.user, PresenceStatus::Disconnected);
        } else {
            debug!(user = %ticket.user, "Offline check superseded by reconnect");
        }
        offline
    }

    /// Open connections for `user`.
    pub async fn connections(&self, user: &UserId) -> u32 {
        self.state.lock().await.table.connections(user)
    }

    /// Whether the backend currently considers `user` online.
    pub async fn is_online(&self, user: &UserId) -> bool {
        self.state.lock().await.table.is_online(user)
    }

    /// Number of users the backend currently considers online.
    pub async fn online_count(&self) -> usize {
        self.state.lock().await.table.online_users()
    }

    /// Fire-and-forget backend call, queued behind the user's previous call.
    /// Failures are logged and dropped.
    fn dispatch(&self, state: &mut State, user: UserId, status: PresenceStatus) {
        state.calls.retain(|_, call| !call.is_finished());
        let previous = state.calls.remove(&user);

        let notifier = Arc::clone(&self.notifier);
        let key = user.clone();
        let call = tokio::spawn(async move {
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            match notifier.notify(&user, status).await {
                Ok(()) => debug!(user = %user, status = %status, "Backend notified"),
                Err(e) => {
                    warn!(user = %user, status = %status, error = %e, "Backend notification failed")
                }
            }
        });
        state.calls.insert(key, call);
    }
}
