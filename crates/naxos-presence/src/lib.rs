//! Presence tracking for the forum relay.
//!
//! Counts open connections per user, debounces the drop to zero so that
//! page navigation does not flap a user offline, and reports aggregate
//! online/offline transitions to the forum backend.

pub mod notifier;
pub mod scheduler;
pub mod table;
pub mod tracker;

pub use notifier::{HttpNotifier, Notifier};
pub use scheduler::OfflineScheduler;
pub use table::{Arrival, OfflineTicket, PresenceTable};
pub use tracker::PresenceTracker;
