//! Configuration schema types for the presence relay.
//!
//! All structs use `serde(default)` so partial configs work correctly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration passed into the relay at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub presence: PresenceConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Server
// =============================================================================

/// Inbound listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the listener to.
    pub bind: String,
    pub port: u16,
    /// Cookie carrying the session credential.
    pub session_cookie: String,
    /// Interval between online-count log lines.
    pub stats_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 8002,
            session_cookie: "sessionid".into(),
            stats_interval_secs: 60,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

// =============================================================================
// Backend
// =============================================================================

/// HTTP verb used for presence callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyMethod {
    /// Parameters in the query string.
    Get,
    /// Parameters as an urlencoded form body.
    Post,
}

impl NotifyMethod {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "get" => Some(NotifyMethod::Get),
            "post" => Some(NotifyMethod::Post),
            _ => None,
        }
    }
}

/// The forum backend that receives presence transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
    pub method: NotifyMethod,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            scheme: "http".into(),
            host: "localhost".into(),
            port: None,
            path: "/user/node_api/".into(),
            method: NotifyMethod::Get,
            timeout_secs: 10,
        }
    }
}

impl BackendConfig {
    /// Full callback URL, e.g. `http://forum:8000/user/node_api/`.
    pub fn endpoint(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}{}", self.scheme, self.host, port, self.path),
            None => format!("{}://{}{}", self.scheme, self.host, self.path),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// =============================================================================
// Presence
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Grace period between a user's last disconnect and the offline report.
    pub debounce_ms: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self { debounce_ms: 5000 }
    }
}

impl PresenceConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

// =============================================================================
// Logging
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Verbose mode: debug-level logs and backend response bodies.
    pub debug: bool,
    /// Filter directive used when `RUST_LOG` is unset and `debug` is off.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: "info".into(),
        }
    }
}
