//! In-memory presence table.
//!
//! Pure bookkeeping with no I/O or timers, so every transition can be
//! exercised synchronously. Callers are responsible for serializing access.

use std::collections::HashMap;

use naxos_common::UserId;

/// What a new connection meant for the user's aggregate presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    /// The user was offline; the backend must be told.
    CameOnline,
    /// The user came back inside the debounce window. The backend never saw
    /// them leave, so nothing is reported.
    Resumed,
    /// Another tab or device for a user who is already online.
    Additional,
}

impl Arrival {
    pub fn came_online(self) -> bool {
        matches!(self, Arrival::CameOnline)
    }
}

/// Handle for a deferred offline check, issued when a user's last
/// connection closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineTicket {
    pub user: UserId,
    epoch: u64,
}

/// Connection counts keyed by user.
///
/// `counts` only ever holds users with at least one open connection. A user
/// whose count dropped to zero moves to `pending` until their offline check
/// runs or they reconnect; absence from both maps is the offline state.
#[derive(Debug, Default)]
pub struct PresenceTable {
    counts: HashMap<UserId, u32>,
    pending: HashMap<UserId, u64>,
    next_epoch: u64,
}

impl PresenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection for `user`.
    pub fn connect(&mut self, user: &UserId) -> Arrival {
        if let Some(count) = self.counts.get_mut(user) {
            *count += 1;
            return Arrival::Additional;
        }

        self.counts.insert(user.clone(), 1);
        if self.pending.remove(user).is_some() {
            Arrival::Resumed
        } else {
            Arrival::CameOnline
        }
    }

    /// Record a closed connection for `user`.
    ///
    /// Returns a ticket when this was the user's last connection; the caller
    /// must run [`offline_check`](Self::offline_check) with it once the
    /// debounce window has elapsed. Unknown users are ignored.
    pub fn disconnect(&mut self, user: &UserId) -> Option<OfflineTicket> {
        let count = self.counts.get_mut(user)?;
        if *count > 1 {
            *count -= 1;
            return None;
        }

        self.counts.remove(user);
        let epoch = self.next_epoch;
        self.next_epoch += 1;
        self.pending.insert(user.clone(), epoch);
        Some(OfflineTicket {
            user: user.clone(),
            epoch,
        })
    }

    /// Settle a deferred disconnect. Returns `true` when the user is now
    /// offline and the backend must be told.
    ///
    /// A ticket is stale, and this is a no-op, if the user reconnected after
    /// it was issued, even if they have since dropped to zero again.
    pub fn offline_check(&mut self, ticket: &OfflineTicket) -> bool {
        match self.pending.get(&ticket.user) {
            Some(&epoch) if epoch == ticket.epoch => {
                self.pending.remove(&ticket.user);
                true
            }
            _ => false,
        }
    }

    /// Open connections for `user`.
    pub fn connections(&self, user: &UserId) -> u32 {
        self.counts.get(user).copied().unwrap_or(0)
    }

    /// Whether the backend currently considers `user` online. Includes users
    /// inside their debounce window.
    pub fn is_online(&self, user: &UserId) -> bool {
        self.counts.contains_key(user) || self.pending.contains_key(user)
    }

    /// Users the backend currently considers online.
    pub fn online_users(&self) -> usize {
        self.counts.len() + self.pending.len()
    }
}
