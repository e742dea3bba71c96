//! naxos-relay: WebSocket presence relay for the naxos forum.
//!
//! Accepts WebSocket connections carrying the forum's session cookie,
//! counts open connections per user, and tells the forum backend when a
//! user comes online or, after a debounce window, goes offline. The relay
//! never reads message payloads.

pub mod connection;
pub mod gate;
pub mod server;

pub use gate::Gate;
pub use server::{serve, spawn_stats};
